//! Incremental 3D convex hull.
//!
//! Points are processed in double precision. Tolerances scale with the
//! bounding-box diagonal so the same code works for a single residue and
//! for a whole capsid.

use glam::{DVec3, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};

use super::{GeometryError, Mesh, MeshVertex};

const RELATIVE_EPSILON: f64 = 1e-6;

/// Upper bound on re-insertion sweeps for points left outside by rounding.
const MAX_PASSES: usize = 8;

#[derive(Debug, Clone)]
struct Face {
    v: [usize; 3],
    normal: DVec3,
    offset: f64,
    alive: bool,
    /// Points assigned to this face because they lie outside it.
    outside: Vec<usize>,
    farthest: Option<(usize, f64)>,
}

impl Face {
    fn distance(&self, p: DVec3) -> f64 {
        self.normal.dot(p) - self.offset
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.v;
        [(a, b), (b, c), (c, a)]
    }
}

/// Convex hull as a closed triangle set with outward-facing winding.
#[derive(Debug, Clone)]
pub struct ConvexHull {
    points: Vec<DVec3>,
    faces: Vec<[usize; 3]>,
    epsilon: f64,
}

impl ConvexHull {
    /// Compute the hull of `input`.
    ///
    /// Points are added farthest first. A closing sweep re-inserts any
    /// point that rounding left outside the finished hull.
    ///
    /// # Errors
    ///
    /// [`GeometryError::TooFewPoints`] for fewer than four points,
    /// [`GeometryError::Degenerate`] when all points are coincident,
    /// collinear or coplanar.
    pub fn build(input: &[Vec3]) -> Result<Self, GeometryError> {
        if input.len() < 4 {
            return Err(GeometryError::TooFewPoints {
                needed: 4,
                found: input.len(),
            });
        }
        let points: Vec<DVec3> = input.iter().map(|p| p.as_dvec3()).collect();

        let (min, max) = points.iter().fold(
            (DVec3::splat(f64::INFINITY), DVec3::splat(f64::NEG_INFINITY)),
            |(lo, hi), p| (lo.min(*p), hi.max(*p)),
        );
        let scale = (max - min).length();
        if scale == 0.0 {
            return Err(GeometryError::Degenerate("coincident points"));
        }
        let epsilon = scale * RELATIVE_EPSILON;

        let seed = initial_simplex(&points, epsilon)?;
        let interior =
            (points[seed[0]] + points[seed[1]] + points[seed[2]] + points[seed[3]])
                / 4.0;

        let mut faces: Vec<Face> = [
            [seed[0], seed[1], seed[2]],
            [seed[0], seed[3], seed[1]],
            [seed[1], seed[3], seed[2]],
            [seed[2], seed[3], seed[0]],
        ]
        .into_iter()
        .map(|tri| oriented_face(&points, tri, interior))
        .collect();

        let mut owner: FxHashMap<(usize, usize), usize> = FxHashMap::default();
        for (idx, face) in faces.iter().enumerate() {
            for edge in face.edges() {
                let _ = owner.insert(edge, idx);
            }
        }

        let mut pending: Vec<usize> =
            (0..points.len()).filter(|i| !seed.contains(i)).collect();
        for pass in 0..MAX_PASSES {
            let live: Vec<usize> =
                (0..faces.len()).filter(|&f| faces[f].alive).collect();
            assign(&mut faces, &live, &points, pending, epsilon);
            while let Some((face, apex)) = next_apex(&faces) {
                let hull = HullState {
                    faces: &mut faces,
                    owner: &mut owner,
                    points: &points,
                    interior,
                    epsilon,
                };
                hull.add_apex(face, apex);
            }

            pending = (0..points.len())
                .filter(|&p| {
                    faces
                        .iter()
                        .any(|f| f.alive && f.distance(points[p]) > epsilon)
                })
                .collect();
            if pending.is_empty() {
                break;
            }
            log::debug!(
                "hull pass {pass}: {} points still outside, re-inserting",
                pending.len()
            );
        }

        let faces = faces.into_iter().filter(|f| f.alive).map(|f| f.v).collect();
        Ok(Self {
            points,
            faces,
            epsilon,
        })
    }

    /// Number of triangular faces.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Number of distinct input points on the hull.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        let used: FxHashSet<usize> = self.faces.iter().flatten().copied().collect();
        used.len()
    }

    /// Whether `p` lies inside or on the hull.
    #[must_use]
    pub fn contains(&self, p: Vec3) -> bool {
        let p = p.as_dvec3();
        self.faces.iter().all(|&tri| {
            let (normal, offset) = plane(&self.points, tri);
            normal.dot(p) - offset <= self.epsilon
        })
    }

    /// Flat-shaded mesh, three vertices per face.
    #[must_use]
    pub fn to_mesh(&self) -> Mesh {
        let mut vertices = Vec::with_capacity(self.faces.len() * 3);
        let mut indices = Vec::with_capacity(self.faces.len() * 3);
        for &tri in &self.faces {
            let (normal, _) = plane(&self.points, tri);
            let normal = normal.as_vec3();
            for idx in tri {
                indices.push(vertices.len() as u32);
                vertices.push(MeshVertex::new(self.points[idx].as_vec3(), normal));
            }
        }
        Mesh { vertices, indices }
    }
}

/// Hand each point to the candidate face it lies farthest outside of.
/// Points outside none of them are inside the hull and are dropped.
fn assign(
    faces: &mut [Face],
    candidates: &[usize],
    points: &[DVec3],
    pending: Vec<usize>,
    epsilon: f64,
) {
    for p in pending {
        let best = candidates
            .iter()
            .map(|&f| (f, faces[f].distance(points[p])))
            .filter(|&(_, d)| d > epsilon)
            .max_by(|a, b| a.1.total_cmp(&b.1));
        if let Some((f, d)) = best {
            let face = &mut faces[f];
            face.outside.push(p);
            if !matches!(face.farthest, Some((_, far)) if far >= d) {
                face.farthest = Some((p, d));
            }
        }
    }
}

/// The face holding the point farthest outside the current hull.
fn next_apex(faces: &[Face]) -> Option<(usize, usize)> {
    faces
        .iter()
        .enumerate()
        .filter(|(_, f)| f.alive)
        .filter_map(|(i, f)| f.farthest.map(|(p, d)| (i, p, d)))
        .max_by(|a, b| a.2.total_cmp(&b.2))
        .map(|(i, p, _)| (i, p))
}

/// Mutable view of a hull under construction.
struct HullState<'a> {
    faces: &'a mut Vec<Face>,
    /// Directed edge to the live face it belongs to.
    owner: &'a mut FxHashMap<(usize, usize), usize>,
    points: &'a [DVec3],
    interior: DVec3,
    epsilon: f64,
}

impl HullState<'_> {
    /// Replace the faces `apex` can see with a cone from their horizon.
    fn add_apex(self, start: usize, apex: usize) {
        let p = self.points[apex];

        // Flood across shared edges so the visible region stays connected
        let mut visible = vec![start];
        let mut seen: FxHashSet<usize> = FxHashSet::default();
        let _ = seen.insert(start);
        let mut horizon = Vec::new();
        let mut cursor = 0;
        while cursor < visible.len() {
            let edges = self.faces[visible[cursor]].edges();
            cursor += 1;
            for (a, b) in edges {
                match self.owner.get(&(b, a)) {
                    Some(n) if seen.contains(n) => {}
                    Some(&n) if self.faces[n].distance(p) > self.epsilon => {
                        let _ = seen.insert(n);
                        visible.push(n);
                    }
                    _ => horizon.push((a, b)),
                }
            }
        }

        let mut orphans = Vec::new();
        for &idx in &visible {
            let face = &mut self.faces[idx];
            face.alive = false;
            face.farthest = None;
            orphans.append(&mut face.outside);
            for edge in face.edges() {
                if self.owner.get(&edge) == Some(&idx) {
                    let _ = self.owner.remove(&edge);
                }
            }
        }
        orphans.retain(|&q| q != apex);

        let first_new = self.faces.len();
        for (a, b) in horizon {
            let face = oriented_face(self.points, [a, b, apex], self.interior);
            for edge in face.edges() {
                let _ = self.owner.insert(edge, self.faces.len());
            }
            self.faces.push(face);
        }
        let cone: Vec<usize> = (first_new..self.faces.len()).collect();
        assign(self.faces, &cone, self.points, orphans, self.epsilon);
    }
}

fn plane(points: &[DVec3], [a, b, c]: [usize; 3]) -> (DVec3, f64) {
    let normal = (points[b] - points[a])
        .cross(points[c] - points[a])
        .normalize_or_zero();
    (normal, normal.dot(points[a]))
}

fn oriented_face(points: &[DVec3], tri: [usize; 3], interior: DVec3) -> Face {
    let (normal, offset) = plane(points, tri);
    if normal.dot(interior) - offset > 0.0 {
        let [a, b, c] = tri;
        let (normal, offset) = plane(points, [a, c, b]);
        Face {
            v: [a, c, b],
            normal,
            offset,
            alive: true,
            outside: Vec::new(),
            farthest: None,
        }
    } else {
        Face {
            v: tri,
            normal,
            offset,
            alive: true,
            outside: Vec::new(),
            farthest: None,
        }
    }
}

/// Four affinely independent points: extreme in x, farthest from it,
/// farthest from their line, farthest from their plane.
fn initial_simplex(
    points: &[DVec3],
    epsilon: f64,
) -> Result<[usize; 4], GeometryError> {
    let farthest = |score: &dyn Fn(DVec3) -> f64| {
        points
            .iter()
            .enumerate()
            .map(|(i, p)| (i, score(*p)))
            .fold((0, f64::NEG_INFINITY), |best, cur| {
                if cur.1 > best.1 {
                    cur
                } else {
                    best
                }
            })
    };

    let (a, _) = farthest(&|p| -p.x);
    let pa = points[a];
    let (b, dist_b) = farthest(&|p| (p - pa).length());
    if dist_b <= epsilon {
        return Err(GeometryError::Degenerate("coincident points"));
    }
    let ab = (points[b] - pa).normalize();
    let (c, dist_c) = farthest(&|p| (p - pa).cross(ab).length());
    if dist_c <= epsilon {
        return Err(GeometryError::Degenerate("collinear points"));
    }
    let normal = (points[b] - pa).cross(points[c] - pa).normalize();
    let (d, dist_d) = farthest(&|p| (p - pa).dot(normal).abs());
    if dist_d <= epsilon {
        return Err(GeometryError::Degenerate("coplanar points"));
    }
    Ok([a, b, c, d])
}
