use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Parser", inline)]
#[serde(default)]
/// Structure parser tolerance.
pub struct ParseOptions {
    /// Fraction of skipped ATOM lines above which a warning is logged.
    #[schemars(title = "Skip Warning Ratio", range(min = 0.0, max = 1.0), extend("step" = 0.01))]
    pub skip_warning_ratio: f64,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            skip_warning_ratio: 0.05,
        }
    }
}
