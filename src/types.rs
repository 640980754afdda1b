use serde::{Deserialize, Serialize};

/// Normalized yield record, one per reserve, in the shape the aggregation
/// pipeline ingests.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolRecord {
    pub pool: String,
    pub chain: String,
    pub project: String,
    pub symbol: String,
    pub pool_meta: String,
    pub tvl_usd: f64,
    pub apy_base: f64,
    pub apy_reward: f64,
    pub reward_tokens: Vec<String>,
    pub underlying_tokens: Vec<String>,
    pub total_supply_usd: f64,
    pub total_borrow_usd: f64,
    pub apy_base_borrow: f64,
    // None means "no borrow reward", as opposed to a reward of 0
    pub apy_reward_borrow: Option<f64>,
    pub ltv: f64,
}

/// Chain tags are stored lowercase but displayed capitalized.
pub fn format_chain(chain: &str) -> String {
    capitalize_first(chain)
}

pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
