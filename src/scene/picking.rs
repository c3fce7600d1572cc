//! Pointer hit-testing against residue markers.

use glam::Vec2;
use serde::Serialize;

use super::{ObjectId, Scene, SceneObject};
use crate::camera::{pointer_to_ndc, Camera, Ray};
use crate::geometry::ResidueTag;

const SITE_CONFIDENCE: f32 = 0.9;
const OTHER_CONFIDENCE: f32 = 0.3;

/// Identity record for a hovered residue.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidueInfo {
    /// Key-residue label, e.g. `GLU484`.
    pub id: String,
    /// Chain identifier.
    pub chain: String,
    /// Three-letter residue code.
    pub residue_type: String,
    /// Full amino-acid name.
    pub residue_name: &'static str,
    /// Secondary-structure label (`helix`, `sheet`, `turn`, `coil`).
    pub secondary_structure: &'static str,
    /// Whether a supplied binding site lists this residue.
    pub is_binding_site: bool,
    /// Binding likelihood shown next to the residue.
    pub binding_confidence: f32,
}

impl ResidueInfo {
    /// Build the hover record for a marker's residue.
    #[must_use]
    pub fn from_tag(tag: &ResidueTag) -> Self {
        Self {
            id: tag.label.clone(),
            chain: tag.chain.clone(),
            residue_type: tag.res_name.clone(),
            residue_name: residue_full_name(&tag.res_name),
            secondary_structure: tag.secondary_structure.label(),
            is_binding_site: tag.is_binding_site,
            binding_confidence: if tag.is_binding_site {
                SITE_CONFIDENCE
            } else {
                OTHER_CONFIDENCE
            },
        }
    }
}

/// Full name of a residue from its three-letter code.
#[must_use]
pub fn residue_full_name(code: &str) -> &'static str {
    match code {
        "ALA" => "Alanine",
        "ARG" => "Arginine",
        "ASN" => "Asparagine",
        "ASP" => "Aspartate",
        "CYS" => "Cysteine",
        "GLN" => "Glutamine",
        "GLU" => "Glutamate",
        "GLY" => "Glycine",
        "HIS" => "Histidine",
        "ILE" => "Isoleucine",
        "LEU" => "Leucine",
        "LYS" => "Lysine",
        "MET" => "Methionine",
        "PHE" => "Phenylalanine",
        "PRO" => "Proline",
        "SER" => "Serine",
        "THR" => "Threonine",
        "TRP" => "Tryptophan",
        "TYR" => "Tyrosine",
        "VAL" => "Valine",
        "HOH" => "Water",
        _ => "Unknown",
    }
}

impl Scene {
    /// Nearest visible residue marker hit by `ray`, with the hit distance.
    #[must_use]
    pub fn pick(&self, ray: &Ray) -> Option<(&SceneObject, f32)> {
        self.objects
            .iter()
            .filter(|o| o.visible && o.residue.is_some())
            .filter_map(|o| {
                let radius = o.pick_radius?;
                ray.intersect_sphere(o.position, radius).map(|t| (o, t))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Residue under the pointer. `pointer` and `viewport` are in pixels,
    /// origin top-left. A miss (or an empty viewport) is `None`.
    #[must_use]
    pub fn hit_test(
        &self,
        pointer: Vec2,
        viewport: Vec2,
        camera: &Camera,
    ) -> Option<ResidueInfo> {
        let ndc = pointer_to_ndc(pointer, viewport)?;
        let (obj, _) = self.pick(&camera.ray_from_ndc(ndc))?;
        obj.residue.as_ref().map(ResidueInfo::from_tag)
    }

    /// Hit-test and notify hover listeners when the hovered marker
    /// changes. Returns the current hover record.
    pub fn pointer_moved(
        &mut self,
        pointer: Vec2,
        viewport: Vec2,
        camera: &Camera,
    ) -> Option<ResidueInfo> {
        let hit: Option<(ObjectId, ResidueInfo)> = pointer_to_ndc(pointer, viewport)
            .and_then(|ndc| self.pick(&camera.ray_from_ndc(ndc)))
            .and_then(|(obj, _)| {
                obj.residue
                    .as_ref()
                    .map(|tag| (obj.id, ResidueInfo::from_tag(tag)))
            });

        let hovered = hit.as_ref().map(|(id, _)| *id);
        if hovered != self.hovered {
            self.hovered = hovered;
            let info = hit.as_ref().map(|(_, info)| info);
            self.notify(info);
        }
        hit.map(|(_, info)| info)
    }

    /// Marker currently under the pointer, as of the last
    /// [`pointer_moved`](Self::pointer_moved).
    #[must_use]
    pub fn hovered(&self) -> Option<ObjectId> {
        self.hovered
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use glam::Vec3;

    use super::*;
    use crate::options::CameraOptions;
    use crate::scene::tests::assemble_text;
    use crate::structure::test_data;

    const VIEWPORT: Vec2 = Vec2::new(800.0, 800.0);

    fn camera() -> Camera {
        Camera::looking_at_origin(&CameraOptions::default(), 1.0)
    }

    /// Two residues on the x axis, centered at the origin after assembly.
    fn two_residue_scene() -> Scene {
        let text = [
            test_data::atom_line(1, "CA", "GLU", 'A', 2, [-3.0, 0.0, 0.0]),
            test_data::atom_line(2, "CA", "LYS", 'A', 3, [3.0, 0.0, 0.0]),
        ]
        .join("\n");
        let mut scene = Scene::new();
        let _ = assemble_text(&mut scene, "1ABC", &text);
        scene
    }

    fn pixel_of(world: Vec3) -> Vec2 {
        let ndc = camera().build_matrix().project_point3(world);
        Vec2::new((ndc.x + 1.0) * 0.5 * VIEWPORT.x, (1.0 - ndc.y) * 0.5 * VIEWPORT.y)
    }

    #[test]
    fn hit_returns_identity() {
        let scene = two_residue_scene();
        let info = scene
            .hit_test(pixel_of(Vec3::new(-3.0, 0.0, 0.0)), VIEWPORT, &camera())
            .unwrap();
        assert_eq!(info.id, "GLU2");
        assert_eq!(info.chain, "A");
        assert_eq!(info.residue_type, "GLU");
        assert_eq!(info.residue_name, "Glutamate");
        assert_eq!(info.secondary_structure, "coil");
        assert!(info.is_binding_site);
        assert_eq!(info.binding_confidence, 0.9);

        let info = scene
            .hit_test(pixel_of(Vec3::new(3.0, 0.0, 0.0)), VIEWPORT, &camera())
            .unwrap();
        assert_eq!(info.id, "LYS3");
        assert!(!info.is_binding_site);
        assert_eq!(info.binding_confidence, 0.3);
    }

    #[test]
    fn miss_is_none() {
        let scene = two_residue_scene();
        assert!(scene.hit_test(Vec2::ZERO, VIEWPORT, &camera()).is_none());
        assert!(scene
            .hit_test(pixel_of(Vec3::new(0.0, 5.0, 0.0)), VIEWPORT, &camera())
            .is_none());
        assert!(scene.hit_test(Vec2::ONE, Vec2::ZERO, &camera()).is_none());
        assert!(Scene::new()
            .hit_test(Vec2::new(400.0, 400.0), VIEWPORT, &camera())
            .is_none());
    }

    #[test]
    fn nearest_marker_wins() {
        // Same screen position, different depths.
        let text = [
            test_data::atom_line(1, "CA", "ALA", 'A', 1, [0.0, 0.0, -4.0]),
            test_data::atom_line(2, "CA", "TRP", 'A', 2, [0.0, 0.0, 4.0]),
        ]
        .join("\n");
        let mut scene = Scene::new();
        let _ = assemble_text(&mut scene, "1ABC", &text);
        let info = scene
            .hit_test(Vec2::new(400.0, 400.0), VIEWPORT, &camera())
            .unwrap();
        assert_eq!(info.id, "TRP2");
    }

    #[test]
    fn hidden_markers_are_not_picked() {
        let mut scene = two_residue_scene();
        let ids: Vec<ObjectId> = scene
            .objects()
            .iter()
            .filter(|o| o.residue.is_some())
            .map(|o| o.id)
            .collect();
        assert!(scene.set_visible(ids[0], false));
        assert!(scene
            .hit_test(pixel_of(Vec3::new(-3.0, 0.0, 0.0)), VIEWPORT, &camera())
            .is_none());
    }

    #[test]
    fn listeners_hear_hover_changes_only() {
        let mut scene = two_residue_scene();
        let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::default();
        let sink = Arc::clone(&seen);
        let _ = scene
            .attach_hover_listener(move |info| {
                sink.lock()
                    .unwrap()
                    .push(info.map(|i| i.id.clone()));
            })
            .unwrap();

        let cam = camera();
        let on_glu = pixel_of(Vec3::new(-3.0, 0.0, 0.0));
        assert!(scene.pointer_moved(on_glu, VIEWPORT, &cam).is_some());
        assert!(scene.pointer_moved(on_glu, VIEWPORT, &cam).is_some());
        assert!(scene.pointer_moved(Vec2::ZERO, VIEWPORT, &cam).is_none());
        assert!(scene.hovered().is_none());

        let seen = seen.lock().unwrap();
        assert_eq!(*seen, vec![Some("GLU2".to_owned()), None]);
    }
}
