//! Spline math and frame computation for tube geometry.
//!
//! Pure Vec3 → Vec3 transforms with no structure or color dependencies.

use glam::Vec3;

/// A point along the spline with position, tangent, and frame vectors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct SplinePoint {
    pub pos: Vec3,
    pub tangent: Vec3,
    pub normal: Vec3,
    pub binormal: Vec3,
}

/// Catmull-Rom spline interpolation (passes through all control points).
pub(crate) fn catmull_rom(
    points: &[Vec3],
    segments_per_span: usize,
) -> Vec<Vec3> {
    let n = points.len();
    if n < 2 || segments_per_span == 0 {
        return points.to_vec();
    }
    if n < 3 {
        return linear_interpolate(points, segments_per_span);
    }

    let mut result = Vec::with_capacity((n - 1) * segments_per_span + 1);

    for i in 0..n - 1 {
        let p0 = if i == 0 {
            points[0] * 2.0 - points[1]
        } else {
            points[i - 1]
        };
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = if i + 2 >= n {
            points[n - 1] * 2.0 - points[n - 2]
        } else {
            points[i + 2]
        };

        for j in 0..segments_per_span {
            let t = j as f32 / segments_per_span as f32;
            let t2 = t * t;
            let t3 = t2 * t;

            let pos = 0.5
                * ((2.0 * p1)
                    + (-p0 + p2) * t
                    + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
                    + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3);
            result.push(pos);
        }
    }

    result.push(points[n - 1]);
    result
}

/// Linear interpolation fallback for two-point sequences.
pub(crate) fn linear_interpolate(
    points: &[Vec3],
    segments_per_span: usize,
) -> Vec<Vec3> {
    let mut result = Vec::new();
    for pair in points.windows(2) {
        for j in 0..segments_per_span {
            let t = j as f32 / segments_per_span as f32;
            result.push(pair[0].lerp(pair[1], t));
        }
    }
    if let Some(&last) = points.last() {
        result.push(last);
    }
    result
}

/// Sample a Catmull-Rom curve through `control` and attach
/// rotation-minimizing frames. Returns an empty vector for fewer than two
/// control points.
pub(crate) fn framed_curve(
    control: &[Vec3],
    segments_per_span: usize,
) -> Vec<SplinePoint> {
    if control.len() < 2 {
        return Vec::new();
    }
    let samples = catmull_rom(control, segments_per_span.max(1));
    let n = samples.len();

    // Central differences; one-sided at the ends
    let mut points: Vec<SplinePoint> = (0..n)
        .map(|i| {
            let delta = if i == 0 {
                samples[1] - samples[0]
            } else if i == n - 1 {
                samples[n - 1] - samples[n - 2]
            } else {
                samples[i + 1] - samples[i - 1]
            };
            SplinePoint {
                pos: samples[i],
                tangent: delta.normalize_or_zero(),
                normal: Vec3::ZERO,
                binormal: Vec3::ZERO,
            }
        })
        .collect();

    carry_tangents(&mut points);
    compute_rmf(&mut points);
    points
}

/// Coincident samples have no direction of their own; borrow the nearest
/// defined tangent so every frame is well formed.
fn carry_tangents(points: &mut [SplinePoint]) {
    let Some(first) = points.iter().map(|p| p.tangent).find(|t| *t != Vec3::ZERO)
    else {
        return;
    };
    let mut last = first;
    for p in points.iter_mut() {
        if p.tangent == Vec3::ZERO {
            p.tangent = last;
        } else {
            last = p.tangent;
        }
    }
}

/// Compute Rotation Minimizing Frames using the double reflection method
/// (Wang et al. 2008).
pub(crate) fn compute_rmf(points: &mut [SplinePoint]) {
    if points.is_empty() {
        return;
    }

    let t0 = points[0].tangent;
    let arbitrary = if t0.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    let n0 = t0.cross(arbitrary).normalize_or_zero();
    let b0 = t0.cross(n0).normalize_or_zero();

    points[0].normal = n0;
    points[0].binormal = b0;

    for i in 0..points.len() - 1 {
        let x_i = points[i].pos;
        let x_i1 = points[i + 1].pos;
        let t_i = points[i].tangent;
        let t_i1 = points[i + 1].tangent;
        let r_i = points[i].normal;

        let v1 = x_i1 - x_i;
        let c1 = v1.dot(v1);

        if c1 < 1e-10 {
            points[i + 1].normal = r_i;
            points[i + 1].binormal = points[i].binormal;
            continue;
        }

        // First reflection
        let r_i_l = r_i - (2.0 / c1) * v1.dot(r_i) * v1;
        let t_i_l = t_i - (2.0 / c1) * v1.dot(t_i) * v1;

        // Second reflection
        let v2 = t_i1 - t_i_l;
        let c2 = v2.dot(v2);

        let r_i1 = if c2 < 1e-10 {
            r_i_l
        } else {
            r_i_l - (2.0 / c2) * v2.dot(r_i_l) * v2
        };

        // Ensure orthonormality
        let r_i1 = (r_i1 - t_i1 * t_i1.dot(r_i1)).normalize_or_zero();
        let s_i1 = t_i1.cross(r_i1).normalize_or_zero();

        points[i + 1].normal = r_i1;
        points[i + 1].binormal = s_i1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catmull_rom_passes_through_controls() {
        let control = [
            Vec3::ZERO,
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(2.0, 0.0, 1.0),
            Vec3::new(3.0, 1.0, 2.0),
        ];
        let samples = catmull_rom(&control, 4);
        assert_eq!(samples.len(), 3 * 4 + 1);
        for (i, c) in control.iter().enumerate() {
            assert!((samples[i * 4] - *c).length() < 1e-5);
        }
    }

    #[test]
    fn two_points_interpolate_linearly() {
        let samples = catmull_rom(&[Vec3::ZERO, Vec3::X * 4.0], 4);
        assert_eq!(samples.len(), 5);
        assert!((samples[1] - Vec3::X).length() < 1e-6);
    }

    #[test]
    fn frames_are_orthonormal() {
        let control: Vec<Vec3> = (0..8)
            .map(|i| {
                let t = i as f32 * 0.7;
                Vec3::new(2.3 * t.cos(), 2.3 * t.sin(), 1.5 * t)
            })
            .collect();
        for p in framed_curve(&control, 4) {
            assert!((p.tangent.length() - 1.0).abs() < 1e-4);
            assert!((p.normal.length() - 1.0).abs() < 1e-4);
            assert!(p.tangent.dot(p.normal).abs() < 1e-3);
            assert!(p.binormal.dot(p.normal).abs() < 1e-3);
        }
    }

    #[test]
    fn coincident_points_still_get_frames() {
        let control = [Vec3::ZERO, Vec3::ZERO, Vec3::X, Vec3::new(2.0, 0.5, 0.0)];
        let points = framed_curve(&control, 2);
        assert!(points.iter().all(|p| p.normal.is_finite()));
        assert!(points.iter().all(|p| p.tangent != Vec3::ZERO));
    }

    #[test]
    fn single_point_yields_nothing() {
        assert!(framed_curve(&[Vec3::ONE], 4).is_empty());
    }
}
