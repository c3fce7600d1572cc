use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Display", inline)]
#[serde(default)]
/// Display toggles for the assembled scene.
pub struct DisplayOptions {
    /// Whether the surface envelope is drawn opaque enough to see.
    #[schemars(title = "Show Surface")]
    pub show_surface: bool,
    /// Whether binding-site residues get the enlarged highlighted marker.
    #[schemars(title = "Show Binding Sites")]
    pub show_binding_sites: bool,
    /// Surface opacity used while the surface is shown.
    #[schemars(title = "Surface Opacity", range(min = 0.05, max = 1.0), extend("step" = 0.05))]
    pub surface_opacity: f32,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_surface: false,
            show_binding_sites: true,
            surface_opacity: 0.35,
        }
    }
}

impl DisplayOptions {
    /// Opacity the surface material should carry right now.
    #[must_use]
    pub fn effective_surface_opacity(&self) -> f32 {
        if self.show_surface {
            self.surface_opacity
        } else {
            0.0
        }
    }
}
