//! CPU-side geometry synthesis for the four structure representations.
//!
//! Each builder reads a parsed [`Structure`](crate::structure::Structure)
//! and produces meshes in structure coordinates (angstroms, uncentered).
//! Builders are independent: a failure in one is recorded in
//! [`SynthesizedGeometry::degraded`] and never affects the others.
//!
//! Vertex data is `bytemuck`-castable so a renderer can upload it directly.

mod backbone;
mod hull;
mod markers;
mod ribbon;
mod sphere;
mod spline;
mod surface;
mod tube;

use std::fmt;
use std::sync::Arc;

pub use backbone::build_backbone;
use glam::Vec3;
pub use hull::ConvexHull;
pub use markers::build_markers;
pub use ribbon::build_ribbons;
use serde::Serialize;
pub use sphere::uv_sphere;
pub use surface::build_surface;
pub use tube::build_tube;

use crate::options::{ColorOptions, DisplayOptions, GeometryOptions};
use crate::structure::{BindingSite, SecondaryStructureKind, Structure};
use crate::util::hash::hash_vec3_slices;

/// Vertex layout shared by every generated mesh.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MeshVertex {
    /// Position in mesh-local coordinates.
    pub position: [f32; 3],
    /// Unit surface normal.
    pub normal: [f32; 3],
}

impl MeshVertex {
    fn new(position: Vec3, normal: Vec3) -> Self {
        Self {
            position: position.into(),
            normal: normal.into(),
        }
    }
}

/// Indexed triangle mesh.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex buffer.
    pub vertices: Vec<MeshVertex>,
    /// Triangle list, three indices per triangle.
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Raw vertex bytes for GPU upload.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Raw index bytes for GPU upload.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Whether the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Vertex positions as vectors.
    #[must_use]
    pub fn positions(&self) -> Vec<Vec3> {
        self.vertices
            .iter()
            .map(|v| Vec3::from(v.position))
            .collect()
    }

    /// Digest of the vertex positions, for change detection.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        hash_vec3_slices(&[self.positions()])
    }
}

/// Surface appearance of one scene object. Colors are `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Material {
    /// Base color.
    pub color: u32,
    /// 1.0 is opaque.
    pub opacity: f32,
    /// PBR roughness.
    pub roughness: f32,
    /// PBR metalness.
    pub metalness: f32,
    /// Emissive color.
    pub emissive: u32,
    /// Emissive strength, 0 for none.
    pub emissive_intensity: f32,
    /// Render back faces too.
    pub double_sided: bool,
}

impl Material {
    /// Opaque, non-emissive material.
    #[must_use]
    pub fn new(color: u32, roughness: f32, metalness: f32) -> Self {
        Self {
            color,
            opacity: 1.0,
            roughness,
            metalness,
            emissive: 0,
            emissive_intensity: 0.0,
            double_sided: false,
        }
    }

    /// Add an emissive glow.
    #[must_use]
    pub fn with_emissive(mut self, color: u32, intensity: f32) -> Self {
        self.emissive = color;
        self.emissive_intensity = intensity;
        self
    }

    /// Whether the renderer must blend this material.
    #[must_use]
    pub fn is_transparent(&self) -> bool {
        self.opacity < 1.0
    }
}

/// Why a representation (or one piece of it) could not be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// Not enough input points for the requested shape.
    TooFewPoints {
        /// Minimum required.
        needed: usize,
        /// Points supplied.
        found: usize,
    },
    /// Input points are collinear, coplanar or coincident.
    Degenerate(&'static str),
}

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooFewPoints { needed, found } => {
                write!(f, "need at least {needed} points, got {found}")
            }
            Self::Degenerate(what) => write!(f, "degenerate input: {what}"),
        }
    }
}

impl std::error::Error for GeometryError {}

/// The four representation families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Representation {
    /// Per-chain backbone tube.
    Backbone,
    /// Per-segment secondary-structure tube.
    Ribbon,
    /// Per-residue sphere.
    Marker,
    /// Whole-structure envelope.
    Surface,
}

/// A representation piece that was omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct Degraded {
    /// Which family.
    pub representation: Representation,
    /// Chain, segment or structure the piece would have covered.
    pub subject: String,
    /// What went wrong.
    pub error: GeometryError,
}

impl Degraded {
    pub(crate) fn record(
        representation: Representation,
        subject: String,
        error: GeometryError,
    ) -> Self {
        log::warn!("{representation:?} for {subject} omitted: {error}");
        Self {
            representation,
            subject,
            error,
        }
    }
}

/// Backbone tube for one chain.
#[derive(Debug, Clone)]
pub struct BackboneTrace {
    /// Chain identifier.
    pub chain: String,
    /// Number of alpha carbons the curve passes through.
    pub residue_count: usize,
    /// Tube mesh.
    pub mesh: Mesh,
    /// Appearance.
    pub material: Material,
}

/// Tube over one secondary-structure segment.
#[derive(Debug, Clone)]
pub struct Ribbon {
    /// Segment kind.
    pub kind: SecondaryStructureKind,
    /// Chain the segment lies on.
    pub chain: String,
    /// First residue number.
    pub start_res: i32,
    /// Last residue number.
    pub end_res: i32,
    /// Tube radius.
    pub radius: f32,
    /// Tube mesh.
    pub mesh: Mesh,
    /// Appearance.
    pub material: Material,
}

/// Identity of the residue a marker stands for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResidueTag {
    /// Key-residue notation, e.g. `GLU484`.
    pub label: String,
    /// Three-letter residue name.
    pub res_name: String,
    /// Residue number within the chain.
    pub res_seq: i32,
    /// Chain identifier.
    pub chain: String,
    /// Secondary structure at this residue.
    pub secondary_structure: SecondaryStructureKind,
    /// Whether a supplied binding site lists this residue.
    pub is_binding_site: bool,
    /// Serial of the originating alpha-carbon atom.
    pub atom_serial: i32,
}

/// Sphere marking one alpha carbon.
#[derive(Debug, Clone)]
pub struct ResidueMarker {
    /// Residue identity.
    pub tag: ResidueTag,
    /// Sphere center in structure coordinates.
    pub center: Vec3,
    /// Sphere radius.
    pub radius: f32,
    /// Sphere mesh centered at the origin, shared among markers of the
    /// same radius.
    pub mesh: Arc<Mesh>,
    /// Appearance.
    pub material: Material,
}

/// Convex envelope around the alpha carbons.
#[derive(Debug, Clone)]
pub struct SurfaceEnvelope {
    /// Hull mesh.
    pub mesh: Mesh,
    /// Appearance (transparent unless the surface is shown).
    pub material: Material,
    /// Number of hull vertices.
    pub hull_vertices: usize,
}

/// Output of [`synthesize`].
#[derive(Debug, Clone, Default)]
pub struct SynthesizedGeometry {
    /// One tube per chain with at least two alpha carbons.
    pub backbone: Vec<BackboneTrace>,
    /// One tube per buildable segment.
    pub ribbons: Vec<Ribbon>,
    /// One sphere per alpha carbon.
    pub markers: Vec<ResidueMarker>,
    /// Envelope, absent when the hull could not be built.
    pub surface: Option<SurfaceEnvelope>,
    /// Pieces that were omitted, with reasons.
    pub degraded: Vec<Degraded>,
}

impl SynthesizedGeometry {
    /// Total number of scene objects this geometry becomes.
    #[must_use]
    pub fn object_count(&self) -> usize {
        self.backbone.len()
            + self.ribbons.len()
            + self.markers.len()
            + usize::from(self.surface.is_some())
    }
}

/// Build all four representations.
#[must_use]
pub fn synthesize(
    structure: &Structure,
    sites: &[BindingSite],
    geometry: &GeometryOptions,
    colors: &ColorOptions,
    display: &DisplayOptions,
) -> SynthesizedGeometry {
    let mut degraded = Vec::new();

    let backbone = build_backbone(structure, geometry, colors, &mut degraded);
    let ribbons = build_ribbons(structure, geometry, colors, &mut degraded);
    let markers = build_markers(structure, sites, geometry, colors, display);
    let surface = match build_surface(structure, colors, display) {
        Ok(surface) => Some(surface),
        Err(error) => {
            degraded.push(Degraded::record(
                Representation::Surface,
                "structure".to_owned(),
                error,
            ));
            None
        }
    };

    log::debug!(
        "synthesized {} backbone, {} ribbon, {} marker objects ({} degraded)",
        backbone.len(),
        ribbons.len(),
        markers.len(),
        degraded.len()
    );

    SynthesizedGeometry {
        backbone,
        ribbons,
        markers,
        surface,
        degraded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParseOptions;
    use crate::structure::{parse_pdb, test_data};

    #[test]
    fn material_transparency() {
        let m = Material::new(0xFF_8000, 0.4, 0.3);
        assert!(!m.is_transparent());
        let shown = Material { opacity: 0.35, ..m };
        assert!(shown.is_transparent());
    }

    #[test]
    fn vertex_bytes_match_layout() {
        let mesh = Mesh {
            vertices: vec![MeshVertex::new(Vec3::ONE, Vec3::Z); 2],
            indices: vec![0, 1, 0],
        };
        assert_eq!(mesh.vertex_bytes().len(), 2 * 24);
        assert_eq!(mesh.index_bytes().len(), 12);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn synthesizes_every_representation() {
        let s = parse_pdb(&test_data::two_chain_pdb(), &ParseOptions::default())
            .unwrap();
        let sites = [BindingSite::new("site", "GLU2, TRP6")];
        let geo = synthesize(
            &s,
            &sites,
            &GeometryOptions::default(),
            &ColorOptions::default(),
            &DisplayOptions::default(),
        );
        // Chain B has one CA: no backbone for it.
        assert_eq!(geo.backbone.len(), 1);
        assert_eq!(geo.ribbons.len(), 1);
        assert_eq!(geo.markers.len(), 7);
        assert!(geo.surface.is_some());
        assert!(geo.degraded.is_empty());
        assert_eq!(geo.object_count(), 1 + 1 + 7 + 1);
        let flagged: Vec<&str> = geo
            .markers
            .iter()
            .filter(|m| m.tag.is_binding_site)
            .map(|m| m.tag.label.as_str())
            .collect();
        assert_eq!(flagged, vec!["GLU2", "TRP6"]);
    }

    #[test]
    fn surface_failure_does_not_affect_others() {
        let text = [
            test_data::atom_line(1, "CA", "ALA", 'A', 1, [0.0, 0.0, 0.0]),
            test_data::atom_line(2, "CA", "GLY", 'A', 2, [3.8, 0.0, 0.0]),
            test_data::atom_line(3, "CA", "SER", 'A', 3, [7.6, 0.0, 0.0]),
        ]
        .join("\n");
        let s = parse_pdb(&text, &ParseOptions::default()).unwrap();
        let geo = synthesize(
            &s,
            &[],
            &GeometryOptions::default(),
            &ColorOptions::default(),
            &DisplayOptions::default(),
        );
        assert!(geo.surface.is_none());
        assert_eq!(geo.backbone.len(), 1);
        assert_eq!(geo.markers.len(), 3);
        assert_eq!(geo.degraded.len(), 1);
        assert_eq!(geo.degraded[0].representation, Representation::Surface);
    }
}
