use std::path::PathBuf;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Source", inline)]
#[serde(default)]
/// Structure source endpoints. URL templates substitute `{id}` (upper
/// case) and `{id_lower}`.
pub struct SourceOptions {
    /// Public download endpoint, tried first.
    pub primary_url: String,
    /// Local proxy endpoint, tried when the primary fails.
    pub proxy_url: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Directory consulted before any network request; downloads are
    /// written back into it.
    pub cache_dir: Option<PathBuf>,
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self {
            primary_url: "https://files.rcsb.org/download/{id}.pdb".to_owned(),
            proxy_url: "http://127.0.0.1:5000/structures/fetch/{id}".to_owned(),
            timeout_secs: 30,
            cache_dir: None,
        }
    }
}
