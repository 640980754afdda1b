pub mod solend;

use async_trait::async_trait;

use crate::types::PoolRecord;

/// Abstraction for protocol adaptors feeding the yield pipeline.
#[async_trait]
pub trait YieldAdaptor: Send + Sync {
    /// Project slug the records are filed under
    fn project(&self) -> &'static str;

    /// Whether the adaptor can backfill historical data
    fn timetravel(&self) -> bool {
        false
    }

    /// Listing page shown alongside the pools
    fn url(&self) -> &'static str;

    /// Fetch the current pool records
    async fn pools(&self) -> anyhow::Result<Vec<PoolRecord>>;
}

pub use solend::SolendAdaptor;
