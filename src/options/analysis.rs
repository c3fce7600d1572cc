use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Which analysis backend to use.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Deterministic canned results.
    #[default]
    Fixture,
    /// OpenAI-compatible chat-completions endpoint.
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Analysis", inline)]
#[serde(default)]
/// Analysis provider selection.
pub struct AnalysisOptions {
    /// Backend kind.
    pub provider: ProviderKind,
    /// Chat-completions URL for the remote provider.
    pub endpoint: String,
    /// Model name sent to the remote provider.
    pub model: String,
    /// Environment variable holding the remote API key.
    pub api_key_env: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Fixture,
            endpoint: "https://api.openai.com/v1/chat/completions".to_owned(),
            model: "gpt-4o".to_owned(),
            api_key_env: "OPENAI_API_KEY".to_owned(),
            timeout_secs: 60,
        }
    }
}
