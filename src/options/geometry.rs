use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Geometry", inline)]
#[serde(default)]
/// Geometry detail options for the structure representations.
pub struct GeometryOptions {
    /// Backbone tube radius in angstroms.
    #[schemars(title = "Tube Radius", range(min = 0.05, max = 1.5), extend("step" = 0.05))]
    pub tube_radius: f32,
    /// Number of radial segments around tubes.
    #[schemars(skip)]
    pub tube_radial_segments: u32,
    /// Axial tube segments per residue-to-residue span.
    #[schemars(skip)]
    pub segments_per_span: u32,
    /// Ribbon radius for helices.
    #[schemars(title = "Helix Radius", range(min = 0.1, max = 2.0), extend("step" = 0.05))]
    pub helix_radius: f32,
    /// Ribbon radius for sheets and other segments.
    #[schemars(title = "Strand Radius", range(min = 0.1, max = 2.0), extend("step" = 0.05))]
    pub strand_radius: f32,
    /// Marker sphere radius for ordinary residues.
    #[schemars(title = "Marker Radius", range(min = 0.1, max = 2.0), extend("step" = 0.05))]
    pub marker_radius: f32,
    /// Marker sphere radius for binding-site residues.
    #[schemars(title = "Binding Marker Radius", range(min = 0.1, max = 3.0), extend("step" = 0.05))]
    pub binding_marker_radius: f32,
    /// Longitude and latitude bands of marker spheres.
    #[schemars(skip)]
    pub sphere_segments: u32,
}

impl Default for GeometryOptions {
    fn default() -> Self {
        Self {
            tube_radius: 0.3,
            tube_radial_segments: 8,
            segments_per_span: 4,
            helix_radius: 0.6,
            strand_radius: 0.4,
            marker_radius: 0.4,
            binding_marker_radius: 0.8,
            sphere_segments: 16,
        }
    }
}
