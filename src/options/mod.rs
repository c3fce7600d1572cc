//! Centralized loader, geometry and display options with TOML preset
//! support.
//!
//! All tweakable settings (structure sources, parser tolerance, geometry
//! detail, color tables, display toggles, camera, analysis provider) are
//! consolidated here. Options serialize to/from TOML.

mod analysis;
mod camera;
mod colors;
mod display;
mod geometry;
mod parse;
mod source;

use std::path::Path;

pub use analysis::{AnalysisOptions, ProviderKind};
pub use camera::CameraOptions;
pub use colors::{hex_rgb, ColorOptions};
pub use display::DisplayOptions;
pub use geometry::GeometryOptions;
pub use parse::ParseOptions;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
pub use source::SourceOptions;

use crate::error::BindviewError;

/// Top-level options container. All sub-structs use `#[serde(default)]` so
/// partial TOML files (e.g. only overriding `[display]`) work correctly.
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Default, JsonSchema,
)]
#[serde(default)]
pub struct Options {
    /// Where structure files are fetched from.
    pub source: SourceOptions,
    /// Parser tolerance.
    pub parse: ParseOptions,
    /// Tube, ribbon and marker dimensions.
    pub geometry: GeometryOptions,
    /// Color tables.
    #[schemars(skip)]
    pub colors: ColorOptions,
    /// Display toggles.
    pub display: DisplayOptions,
    /// Camera projection parameters.
    pub camera: CameraOptions,
    /// Analysis provider selection.
    pub analysis: AnalysisOptions,
}

impl Options {
    /// Generate JSON Schema describing the UI-exposed options.
    #[must_use]
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Options)
    }

    /// Load options from a TOML file. Missing fields use defaults.
    ///
    /// # Errors
    ///
    /// Returns [`BindviewError::Io`] or [`BindviewError::OptionsParse`].
    pub fn load(path: &Path) -> Result<Self, BindviewError> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| BindviewError::OptionsParse(e.to_string()))
    }

    /// Save options to a TOML file (pretty-printed).
    ///
    /// # Errors
    ///
    /// Returns [`BindviewError::Io`] or [`BindviewError::OptionsParse`].
    pub fn save(&self, path: &Path) -> Result<(), BindviewError> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| BindviewError::OptionsParse(e.to_string()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(std::fs::write(path, content)?)
    }
}
