use serde::de::{Deserializer, Error as DeError, Unexpected};
use serde::Deserialize;

// The API serializes big token amounts as decimal strings and prices as
// either strings or raw numbers depending on the field. Accept both without
// branching at call sites.
fn f64_from_any<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| D::Error::custom("number out of f64 range")),
        serde_json::Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
            D::Error::invalid_value(Unexpected::Str(&s), &"a numeric string")
        }),
        other => Err(D::Error::custom(format!(
            "expected number or numeric string, got {other}"
        ))),
    }
}

// Reward APYs are best-effort: a missing or malformed value counts as 0
// rather than failing the whole run.
fn f64_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match opt {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

/// `GET /v1/config?deployment=...` body.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigResponse {
    pub markets: Vec<MarketEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketEntry {
    pub name: String,
    pub reserves: Vec<MarketReserveEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketReserveEntry {
    pub address: String,
    pub asset: String,
}

/// `GET /v1/reserves?ids=...` body. `results` is absent on some responses;
/// callers treat that as an empty batch.
#[derive(Debug, Clone, Deserialize)]
pub struct ReservesResponse {
    pub results: Option<Vec<ReserveResult>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReserveResult {
    pub reserve: Reserve,
    pub rates: Rates,
    pub rewards: Vec<Reward>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Reserve {
    pub pubkey: String,
    pub liquidity: Liquidity,
    pub collateral: Collateral,
    pub config: ReserveLimits,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Liquidity {
    #[serde(deserialize_with = "f64_from_any")]
    pub available_amount: f64,
    pub mint_decimals: u32,
    /// USD price scaled by 10^18.
    #[serde(deserialize_with = "f64_from_any")]
    pub market_price: f64,
    pub mint_pubkey: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collateral {
    #[serde(deserialize_with = "f64_from_any")]
    pub mint_total_supply: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveLimits {
    /// Percent scaled by 100.
    #[serde(deserialize_with = "f64_from_any")]
    pub loan_to_value_ratio: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rates {
    pub supply_interest: String,
    pub borrow_interest: String,
}

/// Liquidity-mining entry attached to a reserve. `side` is `"supply"` or
/// `"borrow"`; entries occasionally arrive without a mint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub side: String,
    #[serde(default)]
    pub reward_mint: Option<String>,
    #[serde(default, deserialize_with = "f64_or_zero")]
    pub apy: f64,
}
