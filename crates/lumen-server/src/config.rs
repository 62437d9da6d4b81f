use lumen_chart::RecommendOptions;
use lumen_common::types::ExpectedRange;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Seconds between two evaluation cycles.
    #[serde(default = "default_evaluation_interval_secs")]
    pub evaluation_interval_secs: u64,
    /// JSON rules seed loaded into the rule store at startup.
    #[serde(default)]
    pub rules_file: Option<String>,
    /// JSON metrics document read by the file metric source.
    #[serde(default = "default_metrics_file")]
    pub metrics_file: String,
    #[serde(default = "default_max_alerts")]
    pub max_alerts: usize,
    /// Default `tracing` directive; `RUST_LOG` adds to it.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub chart: RecommendOptions,
}

fn default_evaluation_interval_secs() -> u64 {
    30
}

fn default_metrics_file() -> String {
    "data/metrics.json".to_string()
}

fn default_max_alerts() -> usize {
    lumen_storage::DEFAULT_MAX_ALERTS
}

fn default_log_filter() -> String {
    "lumen=info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            evaluation_interval_secs: default_evaluation_interval_secs(),
            rules_file: None,
            metrics_file: default_metrics_file(),
            max_alerts: default_max_alerts(),
            log_filter: default_log_filter(),
            chart: RecommendOptions::default(),
        }
    }
}

impl ServerConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path, e))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path, e))?;
        Ok(config)
    }
}

// ---- Rules seed file types ----

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RulesSeedFile {
    #[serde(default)]
    pub rules: Vec<SeedRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedRule {
    /// Generated when omitted.
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default = "default_seed_severity", alias = "priority")]
    pub severity: String,
    #[serde(default = "default_seed_enabled")]
    pub enabled: bool,
    #[serde(default = "default_seed_logic")]
    pub condition_logic: String,
    #[serde(default)]
    pub conditions: Vec<SeedCondition>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedCondition {
    pub metric_id: String,
    /// Defaults to `metric_id`.
    #[serde(default)]
    pub metric_name: Option<String>,
    /// `>`, `<`, `>=`, `<=`, `==`, `!=`, `change_rate` or `anomaly`.
    pub operator: String,
    /// Threshold, change percentage or minimum anomaly score.
    #[serde(default)]
    pub value: f64,
    #[serde(default)]
    pub time_window: Option<String>,
    #[serde(default)]
    pub direction: Option<String>,
    #[serde(default)]
    pub expected_range: Option<ExpectedRange>,
}

fn default_seed_severity() -> String {
    "info".to_string()
}

fn default_seed_enabled() -> bool {
    true
}

fn default_seed_logic() -> String {
    "and".to_string()
}
