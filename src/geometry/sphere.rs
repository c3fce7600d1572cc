use std::f32::consts::{PI, TAU};

use glam::Vec3;

use super::{Mesh, MeshVertex};

/// Latitude/longitude sphere centered at the origin.
///
/// `segments` is used for both longitude and latitude bands (minimum 3
/// and 2 respectively). Pole rows keep one triangle per band instead of a
/// degenerate quad.
#[must_use]
pub fn uv_sphere(radius: f32, segments: u32) -> Mesh {
    let width = segments.max(3);
    let height = segments.max(2);

    let mut vertices = Vec::with_capacity(((width + 1) * (height + 1)) as usize);
    for iy in 0..=height {
        let v = iy as f32 / height as f32;
        let theta = v * PI;
        for ix in 0..=width {
            let u = ix as f32 / width as f32;
            let phi = u * TAU;
            let normal = Vec3::new(
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            );
            vertices.push(MeshVertex::new(normal * radius, normal));
        }
    }

    let stride = width + 1;
    let mut indices = Vec::new();
    for iy in 0..height {
        for ix in 0..width {
            let a = iy * stride + ix + 1;
            let b = iy * stride + ix;
            let c = (iy + 1) * stride + ix;
            let d = (iy + 1) * stride + ix + 1;

            if iy != 0 {
                indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height - 1 {
                indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    Mesh { vertices, indices }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertices_lie_on_sphere() {
        let mesh = uv_sphere(0.8, 16);
        assert_eq!(mesh.vertices.len(), 17 * 17);
        for v in &mesh.vertices {
            assert!((Vec3::from(v.position).length() - 0.8).abs() < 1e-5);
        }
    }

    #[test]
    fn pole_rows_have_single_triangles() {
        let mesh = uv_sphere(1.0, 16);
        // 16 bands, interior rows two triangles per quad, poles one.
        assert_eq!(mesh.triangle_count(), 16 * (2 * 16 - 2));
    }

    #[test]
    fn clamps_tiny_segment_counts() {
        let mesh = uv_sphere(1.0, 0);
        assert_eq!(mesh.vertices.len(), 4 * 3);
        assert!(!mesh.is_empty());
    }
}
