use glam::Vec3;

use super::{ConvexHull, GeometryError, Material, SurfaceEnvelope};
use crate::options::{ColorOptions, DisplayOptions};
use crate::structure::Structure;

const ROUGHNESS: f32 = 0.3;
const METALNESS: f32 = 0.1;

/// Convex hull of all alpha carbons.
///
/// The envelope is double sided and fully transparent unless
/// [`DisplayOptions::show_surface`] is set.
///
/// # Errors
///
/// Propagates [`ConvexHull::build`] failures: fewer than four alpha
/// carbons, or all of them coplanar.
pub fn build_surface(
    structure: &Structure,
    colors: &ColorOptions,
    display: &DisplayOptions,
) -> Result<SurfaceEnvelope, GeometryError> {
    let points: Vec<Vec3> = structure.alpha_carbons().map(|a| a.position).collect();
    let hull = ConvexHull::build(&points)?;

    let mut material = Material::new(colors.surface_rgb(), ROUGHNESS, METALNESS);
    material.opacity = display.effective_surface_opacity();
    material.double_sided = true;

    Ok(SurfaceEnvelope {
        mesh: hull.to_mesh(),
        material,
        hull_vertices: hull.vertex_count(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParseOptions;
    use crate::structure::{parse_pdb, test_data};

    fn structure() -> Structure {
        parse_pdb(&test_data::two_chain_pdb(), &ParseOptions::default()).unwrap()
    }

    #[test]
    fn transparent_by_default() {
        let surface = build_surface(
            &structure(),
            &ColorOptions::default(),
            &DisplayOptions::default(),
        )
        .unwrap();
        assert_eq!(surface.material.opacity, 0.0);
        assert!(surface.material.double_sided);
        assert_eq!(surface.material.color, 0xFF_FFFF);
        assert!(surface.hull_vertices >= 4);
        assert!(!surface.mesh.is_empty());
    }

    #[test]
    fn shown_surface_uses_configured_opacity() {
        let display = DisplayOptions {
            show_surface: true,
            ..DisplayOptions::default()
        };
        let surface =
            build_surface(&structure(), &ColorOptions::default(), &display).unwrap();
        assert_eq!(surface.material.opacity, display.surface_opacity);
    }

    #[test]
    fn envelope_encloses_every_alpha_carbon() {
        let s = structure();
        let points: Vec<Vec3> = s.alpha_carbons().map(|a| a.position).collect();
        let hull = ConvexHull::build(&points).unwrap();
        assert!(points.iter().all(|p| hull.contains(*p)));
    }

    #[test]
    fn too_few_alpha_carbons() {
        let text = test_data::atom_line(1, "CA", "ALA", 'A', 1, [0.0; 3]);
        let s = parse_pdb(&text, &ParseOptions::default()).unwrap();
        let err = build_surface(&s, &ColorOptions::default(), &DisplayOptions::default())
            .unwrap_err();
        assert_eq!(err, GeometryError::TooFewPoints { needed: 4, found: 1 });
    }
}
