use std::collections::HashMap;

use anyhow::{Context, Result};

use crate::types::{capitalize_first, format_chain, PoolRecord};

use super::types::{ConfigResponse, ReserveResult, ReservesResponse};

pub const PROJECT: &str = "solend";
pub const POOLS_URL: &str = "https://solend.fi/pools";

const CHAIN: &str = "solana";

// One-off data corrections for reward mints the API reports under a
// placeholder id. Extend here, not in the mapping.
const REWARD_MINT_ALIASES: &[(&str, &str)] = &[(
    "SLND_OPTION",
    "SLNDpmoWTVADgEdndyvWzroNL7zSi1dF9PC3xHGtPwp",
)];

/// One reserve from the config document, tagged with its parent market.
#[derive(Debug, Clone)]
pub struct ReserveConfig {
    pub address: String,
    pub asset: String,
    pub market_name: String,
}

#[derive(Clone)]
pub struct SolendMarketData {
    base_url: String,
    deployment: String,
    ids_per_call: usize,
    http: reqwest::Client,
}

impl SolendMarketData {
    pub fn new(base_url: String, deployment: String, ids_per_call: usize) -> Self {
        Self {
            base_url,
            deployment,
            ids_per_call: ids_per_call.max(1),
            http: reqwest::Client::new(),
        }
    }

    /// Fetch the market configuration document and flatten it into the
    /// ordered reserve list. Later steps key off `address`.
    pub async fn fetch_reserve_configs(&self) -> Result<Vec<ReserveConfig>> {
        let url = format!(
            "{}/v1/config?deployment={}",
            self.base_url.trim_end_matches('/'),
            self.deployment
        );

        let resp: ConfigResponse = self
            .http
            .get(&url)
            .send()
            .await
            .context("GET /v1/config failed")?
            .error_for_status()
            .context("GET /v1/config non-200")?
            .json()
            .await
            .context("decode /v1/config json failed")?;

        let mut out: Vec<ReserveConfig> = vec![];
        for market in resp.markets {
            for reserve in market.reserves {
                out.push(ReserveConfig {
                    address: reserve.address,
                    asset: reserve.asset,
                    market_name: market.name.clone(),
                });
            }
        }

        Ok(out)
    }

    /// Fetch market data for the given reserve ids, batched to the
    /// endpoint's id cap, one request at a time. Returns results keyed by
    /// reserve pubkey; a batch whose response carries no `results` field is
    /// skipped.
    async fn fetch_reserves_keyed(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, ReserveResult>> {
        let queries = batch_queries(ids, self.ids_per_call);

        tracing::debug!(
            total_ids = ids.len(),
            batches = queries.len(),
            ids_per_call = self.ids_per_call,
            "fetching reserves in batches"
        );

        let mut by_id: HashMap<String, ReserveResult> = HashMap::with_capacity(ids.len());
        for query in queries {
            let url = format!(
                "{}/v1/reserves?ids={}",
                self.base_url.trim_end_matches('/'),
                query
            );

            let resp: ReservesResponse = self
                .http
                .get(&url)
                .send()
                .await
                .context("GET /v1/reserves failed")?
                .error_for_status()
                .context("GET /v1/reserves non-200")?
                .json()
                .await
                .context("decode /v1/reserves json failed")?;

            match resp.results {
                Some(results) => {
                    for r in results {
                        by_id.insert(r.reserve.pubkey.clone(), r);
                    }
                }
                None => {
                    tracing::warn!(ids = %query, "reserves batch returned no results, skipping");
                }
            }
        }

        Ok(by_id)
    }

    /// Full adaptor pass: config, batched reserve data, join, map.
    pub async fn fetch_pools(&self) -> Result<Vec<PoolRecord>> {
        let configs = self.fetch_reserve_configs().await?;
        tracing::info!(reserves = configs.len(), "reserve configs loaded");

        let ids: Vec<String> = configs.iter().map(|c| c.address.clone()).collect();
        let by_id = self.fetch_reserves_keyed(&ids).await?;

        join_records(&configs, &by_id)
    }
}

/// Comma-joined id lists, one per request, none longer than `per_call` ids.
fn batch_queries(ids: &[String], per_call: usize) -> Vec<String> {
    ids.chunks(per_call.max(1)).map(|c| c.join(",")).collect()
}

/// Join fetched reserve data to the config list by reserve id, preserving
/// config order. Reserves with no fetched data are dropped rather than
/// shifting the pairing of everything after them.
fn join_records(
    configs: &[ReserveConfig],
    by_id: &HashMap<String, ReserveResult>,
) -> Result<Vec<PoolRecord>> {
    let mut out: Vec<PoolRecord> = Vec::with_capacity(configs.len());
    for config in configs {
        match by_id.get(&config.address) {
            Some(raw) => out.push(map_pool(config, raw)?),
            None => {
                tracing::warn!(
                    address = %config.address,
                    asset = %config.asset,
                    "no market data for reserve, dropping"
                );
            }
        }
    }
    Ok(out)
}

fn map_pool(config: &ReserveConfig, raw: &ReserveResult) -> Result<PoolRecord> {
    let liquidity = &raw.reserve.liquidity;
    let collateral = &raw.reserve.collateral;

    let apy_base: f64 = raw
        .rates
        .supply_interest
        .trim()
        .parse()
        .with_context(|| format!("bad supplyInterest for reserve {}", config.address))?;
    let apy_base_borrow: f64 = raw
        .rates
        .borrow_interest
        .trim()
        .parse()
        .with_context(|| format!("bad borrowInterest for reserve {}", config.address))?;

    let apy_reward: f64 = raw
        .rewards
        .iter()
        .filter(|r| r.side == "supply")
        .map(|r| r.apy)
        .sum();
    let apy_reward_borrow: f64 = raw
        .rewards
        .iter()
        .filter(|r| r.side == "borrow")
        .map(|r| r.apy)
        .sum();

    let reward_tokens: Vec<String> = if apy_reward > 0.0 {
        raw.rewards
            .iter()
            .filter(|r| r.side == "supply")
            .filter_map(|r| r.reward_mint.as_deref())
            .map(|mint| reward_mint_alias(mint).to_string())
            .collect()
    } else {
        vec![]
    };

    let scale = 10f64.powi(liquidity.mint_decimals as i32);
    let price_usd = liquidity.market_price / 1e18;

    let total_supply_usd = collateral.mint_total_supply / scale * price_usd;
    let tvl_usd = liquidity.available_amount / scale * price_usd;
    let total_borrow_usd = total_supply_usd - tvl_usd;

    Ok(PoolRecord {
        pool: config.address.clone(),
        chain: format_chain(CHAIN),
        project: PROJECT.to_string(),
        symbol: config.asset.clone(),
        pool_meta: format!("{} Pool", capitalize_first(&config.market_name)),
        tvl_usd,
        apy_base,
        apy_reward,
        reward_tokens,
        underlying_tokens: vec![liquidity.mint_pubkey.clone()],
        total_supply_usd,
        total_borrow_usd,
        apy_base_borrow,
        apy_reward_borrow: if apy_reward_borrow > 0.0 {
            Some(apy_reward_borrow)
        } else {
            None
        },
        ltv: raw.reserve.config.loan_to_value_ratio / 100.0,
    })
}

fn reward_mint_alias(mint: &str) -> &str {
    REWARD_MINT_ALIASES
        .iter()
        .find(|(from, _)| *from == mint)
        .map(|(_, to)| *to)
        .unwrap_or(mint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn reserve_config(address: &str) -> ReserveConfig {
        ReserveConfig {
            address: address.to_string(),
            asset: "USDC".to_string(),
            market_name: "main".to_string(),
        }
    }

    fn reserve_result(pubkey: &str, rewards: serde_json::Value) -> ReserveResult {
        serde_json::from_value(json!({
            "reserve": {
                "pubkey": pubkey,
                "liquidity": {
                    "availableAmount": "100",
                    "mintDecimals": 2,
                    "marketPrice": 1_000_000_000_000_000_000u64,
                    "mintPubkey": "So11111111111111111111111111111111111111112",
                },
                "collateral": { "mintTotalSupply": "200" },
                "config": { "loanToValueRatio": 8000 },
            },
            "rates": { "supplyInterest": "1.5", "borrowInterest": "0.5" },
            "rewards": rewards,
        }))
        .unwrap()
    }

    #[test]
    fn batch_queries_respects_id_cap() {
        let ids: Vec<String> = (0..12).map(|i| format!("id{i}")).collect();
        let queries = batch_queries(&ids, 5);

        assert_eq!(queries.len(), 3);
        for q in &queries {
            assert!(q.split(',').count() <= 5);
        }
        assert_eq!(queries[0], "id0,id1,id2,id3,id4");
        assert_eq!(queries[2], "id10,id11");
    }

    #[test]
    fn exact_multiple_produces_no_trailing_batch() {
        let ids: Vec<String> = (0..10).map(|i| format!("id{i}")).collect();
        let queries = batch_queries(&ids, 5);
        assert_eq!(queries.len(), 2);
        assert!(queries.iter().all(|q| !q.is_empty()));

        assert!(batch_queries(&[], 5).is_empty());
    }

    #[test]
    fn maps_basic_financial_fields() {
        let rec = map_pool(&reserve_config("A"), &reserve_result("A", json!([]))).unwrap();

        assert_eq!(rec.tvl_usd, 1.0);
        assert_eq!(rec.total_supply_usd, 2.0);
        assert_eq!(rec.total_borrow_usd, 1.0);
        assert_eq!(rec.ltv, 80.0);
        assert_eq!(rec.apy_base, 1.5);
        assert_eq!(rec.apy_base_borrow, 0.5);
        assert_eq!(rec.apy_reward, 0.0);
        assert!(rec.reward_tokens.is_empty());
        assert_eq!(rec.apy_reward_borrow, None);
        assert_eq!(rec.chain, "Solana");
        assert_eq!(rec.project, "solend");
        assert_eq!(rec.pool_meta, "Main Pool");
        assert_eq!(
            rec.underlying_tokens,
            vec!["So11111111111111111111111111111111111111112".to_string()]
        );
    }

    #[test]
    fn supply_rewards_sum_and_rewrite_the_slnd_sentinel() {
        let rewards = json!([
            { "side": "supply", "rewardMint": "SLND_OPTION", "apy": "2.0" },
            { "side": "borrow", "rewardMint": "other", "apy": "3.0" },
        ]);
        let rec = map_pool(&reserve_config("A"), &reserve_result("A", rewards)).unwrap();

        assert_eq!(rec.apy_reward, 2.0);
        assert_eq!(
            rec.reward_tokens,
            vec!["SLNDpmoWTVADgEdndyvWzroNL7zSi1dF9PC3xHGtPwp".to_string()]
        );
        assert_eq!(rec.apy_reward_borrow, Some(3.0));
    }

    #[test]
    fn zero_apy_supply_rewards_emit_no_tokens() {
        let rewards = json!([
            { "side": "supply", "rewardMint": "mintA", "apy": "0" },
        ]);
        let rec = map_pool(&reserve_config("A"), &reserve_result("A", rewards)).unwrap();

        assert_eq!(rec.apy_reward, 0.0);
        assert!(rec.reward_tokens.is_empty());
        assert_eq!(rec.apy_reward_borrow, None);
    }

    #[test]
    fn mintless_supply_reward_counts_apy_but_lists_no_token() {
        let rewards = json!([
            { "side": "supply", "apy": "1.0" },
            { "side": "supply", "rewardMint": "mintB", "apy": "0.5" },
        ]);
        let rec = map_pool(&reserve_config("A"), &reserve_result("A", rewards)).unwrap();

        assert_eq!(rec.apy_reward, 1.5);
        assert_eq!(rec.reward_tokens, vec!["mintB".to_string()]);
    }

    #[test]
    fn unparseable_rate_propagates() {
        let mut raw = reserve_result("A", json!([]));
        raw.rates.supply_interest = "nope".to_string();
        assert!(map_pool(&reserve_config("A"), &raw).is_err());
    }

    #[test]
    fn join_drops_unmatched_reserves_without_desync() {
        let configs = vec![reserve_config("A"), reserve_config("B"), reserve_config("C")];
        let mut by_id = HashMap::new();
        by_id.insert("A".to_string(), reserve_result("A", json!([])));
        by_id.insert("C".to_string(), reserve_result("C", json!([])));

        let records = join_records(&configs, &by_id).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].pool, "A");
        assert_eq!(records[1].pool, "C");
    }

    #[test]
    fn reward_mint_alias_passes_unknown_mints_through() {
        assert_eq!(
            reward_mint_alias("SLND_OPTION"),
            "SLNDpmoWTVADgEdndyvWzroNL7zSi1dF9PC3xHGtPwp"
        );
        assert_eq!(reward_mint_alias("anything-else"), "anything-else");
    }
}
