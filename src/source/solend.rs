use async_trait::async_trait;

use crate::solend::market_data::{SolendMarketData, POOLS_URL, PROJECT};
use crate::source::YieldAdaptor;
use crate::types::PoolRecord;

/// Wrapper for Solend's market data fetcher implementing YieldAdaptor
pub struct SolendAdaptor {
    inner: SolendMarketData,
}

impl SolendAdaptor {
    pub fn new(base_url: String, deployment: String, ids_per_call: usize) -> Self {
        Self {
            inner: SolendMarketData::new(base_url, deployment, ids_per_call),
        }
    }
}

#[async_trait]
impl YieldAdaptor for SolendAdaptor {
    fn project(&self) -> &'static str {
        PROJECT
    }

    fn url(&self) -> &'static str {
        POOLS_URL
    }

    async fn pools(&self) -> anyhow::Result<Vec<PoolRecord>> {
        self.inner.fetch_pools().await
    }
}
