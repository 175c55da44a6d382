use aimon_analysis::config::AnalysisConfig;
use aimon_telemetry::TelemetryConfig;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Absent = model-backed analysis tiers disabled.
    #[serde(default)]
    pub llm: Option<LlmConfig>,
    #[serde(default)]
    pub notify: NotifyConfig,
    /// Snowflake 机器标识 (0-31)
    #[serde(default = "default_machine_id")]
    pub machine_id: i32,
    /// Snowflake 节点标识 (0-31)
    #[serde(default = "default_node_id")]
    pub node_id: i32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            telemetry: TelemetryConfig::default(),
            llm: None,
            notify: NotifyConfig::default(),
            machine_id: default_machine_id(),
            node_id: default_node_id(),
        }
    }
}

impl AgentConfig {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }
}

fn default_machine_id() -> i32 {
    1
}

fn default_node_id() -> i32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub api_key: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub max_tokens: Option<usize>,
    #[serde(default)]
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub struct NotifyConfig {
    #[serde(default = "default_true")]
    pub console: bool,
    #[serde(default = "default_true")]
    pub log: bool,
    #[serde(default)]
    pub email: Option<EmailConfig>,
    #[serde(default)]
    pub webhook: Option<WebhookConfig>,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            console: true,
            log: true,
            email: None,
            webhook: None,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    pub smtp_host: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    pub from: String,
    pub recipients: Vec<String>,
    /// Email stays quiet below this level.
    #[serde(default = "default_email_min_level")]
    pub min_level: String,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_email_min_level() -> String {
    "critical".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    pub url: String,
    #[serde(default = "default_webhook_min_level")]
    pub min_level: String,
}

fn default_webhook_min_level() -> String {
    "info".to_string()
}
