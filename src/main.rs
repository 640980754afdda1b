mod config;
mod types;

mod solend;
mod source;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use crate::config::Settings;
use crate::source::{SolendAdaptor, YieldAdaptor};

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

async fn maybe_write_jsonl(path: &Option<String>, line: &str) {
    if let Some(p) = path.as_ref().map(|x| x.trim().to_string()).filter(|x| !x.is_empty()) {
        if let Ok(mut f) = tokio::fs::OpenOptions::new().create(true).append(true).open(&p).await {
            use tokio::io::AsyncWriteExt;
            let _ = f.write_all(line.as_bytes()).await;
            let _ = f.write_all(b"\n").await;
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let s = Settings::from_env()?;
    let adaptor = SolendAdaptor::new(s.base_url.clone(), s.deployment.clone(), s.ids_per_call);

    let started = now_ms();
    let pools = adaptor.pools().await?;

    tracing::info!(
        project = adaptor.project(),
        url = adaptor.url(),
        timetravel = adaptor.timetravel(),
        pools = pools.len(),
        elapsed_ms = now_ms() - started,
        "adaptor run complete"
    );

    for p in &pools {
        let line = serde_json::to_string(p)?;
        maybe_write_jsonl(&s.pools_jsonl_path, &line).await;
    }

    println!("{}", serde_json::to_string_pretty(&pools)?);

    Ok(())
}
