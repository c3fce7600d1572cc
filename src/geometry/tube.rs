//! Tube meshes swept along a Catmull-Rom curve.
//!
//! Used for both the backbone trace and the secondary-structure ribbons;
//! only radius and color differ between them.

use glam::Vec3;

use super::spline::{framed_curve, SplinePoint};
use super::{GeometryError, Mesh, MeshVertex};

/// Sweep a circular cross-section of `radius` along a smooth curve through
/// `control`.
///
/// The curve is sampled `segments_per_span` times between consecutive
/// control points; each sample becomes a ring of `radial_segments`
/// vertices. The tube is open at both ends.
///
/// # Errors
///
/// [`GeometryError::TooFewPoints`] for fewer than two control points,
/// [`GeometryError::Degenerate`] when every control point coincides.
pub fn build_tube(
    control: &[Vec3],
    radius: f32,
    radial_segments: usize,
    segments_per_span: usize,
) -> Result<Mesh, GeometryError> {
    if control.len() < 2 {
        return Err(GeometryError::TooFewPoints {
            needed: 2,
            found: control.len(),
        });
    }
    if radial_segments < 3 {
        return Err(GeometryError::Degenerate("fewer than 3 radial segments"));
    }

    let points = framed_curve(control, segments_per_span);
    if points.iter().any(|p| p.normal == Vec3::ZERO) {
        return Err(GeometryError::Degenerate("coincident control points"));
    }

    Ok(sweep(&points, radius, radial_segments))
}

fn sweep(points: &[SplinePoint], radius: f32, radial_segments: usize) -> Mesh {
    let num_rings = points.len();
    let mut vertices = Vec::with_capacity(num_rings * radial_segments);
    let mut indices = Vec::with_capacity((num_rings - 1) * radial_segments * 6);

    for point in points {
        for k in 0..radial_segments {
            let angle =
                (k as f32 / radial_segments as f32) * std::f32::consts::TAU;
            let offset = point.normal * angle.cos() + point.binormal * angle.sin();
            vertices.push(MeshVertex::new(
                point.pos + offset * radius,
                offset.normalize_or_zero(),
            ));
        }
    }

    // Two triangles per quad between adjacent rings
    for i in 0..num_rings - 1 {
        let ring = (i * radial_segments) as u32;
        let next_ring = ((i + 1) * radial_segments) as u32;

        for k in 0..radial_segments {
            let k_next = ((k + 1) % radial_segments) as u32;
            let k = k as u32;

            let v0 = ring + k;
            let v1 = ring + k_next;
            let v2 = next_ring + k;
            let v3 = next_ring + k_next;

            indices.extend_from_slice(&[v0, v2, v1]);
            indices.extend_from_slice(&[v1, v2, v3]);
        }
    }

    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn helix(n: usize) -> Vec<Vec3> {
        (0..n)
            .map(|i| {
                let t = i as f32;
                Vec3::new(2.3 * t.cos(), 2.3 * t.sin(), 1.5 * t)
            })
            .collect()
    }

    #[test]
    fn ring_and_index_counts() {
        let mesh = build_tube(&helix(5), 0.3, 8, 4).unwrap();
        let rings = 4 * 4 + 1;
        assert_eq!(mesh.vertices.len(), rings * 8);
        assert_eq!(mesh.triangle_count(), (rings - 1) * 8 * 2);
        let max = *mesh.indices.iter().max().unwrap() as usize;
        assert!(max < mesh.vertices.len());
    }

    #[test]
    fn vertices_sit_at_radius_from_curve() {
        let control = [Vec3::ZERO, Vec3::X * 3.8, Vec3::X * 7.6];
        let mesh = build_tube(&control, 0.6, 8, 4).unwrap();
        for v in &mesh.vertices {
            let p = Vec3::from(v.position);
            let off_axis = (p.y * p.y + p.z * p.z).sqrt();
            assert!((off_axis - 0.6).abs() < 1e-4);
        }
    }

    #[test]
    fn too_few_points() {
        assert_eq!(
            build_tube(&[Vec3::ONE], 0.3, 8, 4).unwrap_err(),
            GeometryError::TooFewPoints {
                needed: 2,
                found: 1
            }
        );
    }

    #[test]
    fn coincident_points_are_degenerate() {
        let err = build_tube(&[Vec3::ONE; 3], 0.3, 8, 4).unwrap_err();
        assert!(matches!(err, GeometryError::Degenerate(_)));
    }
}
