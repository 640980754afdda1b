use serde::Deserialize;

fn default_base_url() -> String {
    "https://api.solend.fi".to_string()
}

fn default_deployment() -> String {
    "production".to_string()
}

fn default_ids_per_call() -> usize {
    5
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_deployment")]
    pub deployment: String,

    // The reserves endpoint rejects calls with more than 5 ids.
    #[serde(default = "default_ids_per_call")]
    pub ids_per_call: usize,

    // Optional sink: one pool record per line
    #[serde(default)]
    pub pools_jsonl_path: Option<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let c = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;
        Ok(c.try_deserialize()?)
    }
}
