//! Authoritative scene: flat object storage, structure arena, hover
//! listeners.
//!
//! Every structure-owned object and listener is recorded in the
//! [`StructureArena`] of the structure that created it. Replacing or
//! releasing the structure drops the whole arena, so nothing from a
//! previous load survives regardless of how the caller sequences its
//! requests. Objects added through [`Scene::add_object`] are not
//! structure-owned and survive reloads.

mod picking;

use std::sync::Arc;

use glam::Vec3;
pub use picking::{residue_full_name, ResidueInfo};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::geometry::{Material, Mesh, ResidueTag, SynthesizedGeometry};
use crate::structure::StructureId;

/// Stable identifier of a scene object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize,
)]
pub struct ObjectId(u64);

/// Identifier of an attached hover listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// What a scene object represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectKind {
    /// Per-chain backbone tube.
    Backbone,
    /// Secondary-structure tube.
    Ribbon,
    /// Per-residue sphere; carries a [`ResidueTag`].
    ResidueMarker,
    /// Whole-structure envelope.
    Surface,
    /// Added by the embedding application.
    External,
}

/// Ownership tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ObjectTags {
    /// Owned by the current structure; removed on reload.
    pub structure: bool,
    /// The surface envelope, target of visibility toggling.
    pub surface: bool,
}

/// One positioned, colored piece of geometry.
#[derive(Debug, Clone)]
pub struct SceneObject {
    /// Identifier.
    pub id: ObjectId,
    /// Representation.
    pub kind: ObjectKind,
    /// Ownership tags.
    pub tags: ObjectTags,
    /// Mesh in local coordinates.
    pub mesh: Arc<Mesh>,
    /// Appearance.
    pub material: Material,
    /// World-space translation applied to the mesh.
    pub position: Vec3,
    /// Hidden objects are neither drawn nor picked.
    pub visible: bool,
    /// Residue identity, for markers only.
    pub residue: Option<ResidueTag>,
    /// Pick sphere radius, for markers only.
    pub pick_radius: Option<f32>,
}

/// Callback invoked when the hovered residue changes; `None` when the
/// pointer leaves every marker.
pub type HoverListener = Box<dyn FnMut(Option<&ResidueInfo>) + Send>;

/// Everything owned by the currently loaded structure.
#[derive(Debug, Clone)]
pub struct StructureArena {
    /// Loaded structure.
    pub structure_id: StructureId,
    /// Offset subtracted from every object at insertion.
    pub centroid: Vec3,
    objects: Vec<ObjectId>,
    listeners: Vec<ListenerId>,
}

/// Counts of what a release removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReleaseSummary {
    /// Objects removed.
    pub objects: usize,
    /// Listeners detached.
    pub listeners: usize,
}

/// Result of [`Scene::assemble`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct AssemblySummary {
    /// What the previous structure left behind.
    pub released: ReleaseSummary,
    /// Objects inserted for the new structure.
    pub inserted: usize,
}

/// Serializable snapshot of one object, without mesh data.
#[derive(Debug, Clone, Serialize)]
pub struct ObjectSummary {
    /// Identifier.
    pub id: ObjectId,
    /// Representation.
    pub kind: ObjectKind,
    /// Ownership tags.
    pub tags: ObjectTags,
    /// Translation.
    pub position: [f32; 3],
    /// Visibility.
    pub visible: bool,
    /// Vertex count.
    pub vertices: usize,
    /// Triangle count.
    pub triangles: usize,
    /// Digest of the vertex positions. Identical geometry keeps its digest
    /// across reloads, so exports can be diffed without comparing meshes.
    pub fingerprint: u64,
    /// Appearance.
    pub material: Material,
    /// Residue identity, for markers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub residue: Option<ResidueTag>,
}

/// Serializable snapshot of the scene.
#[derive(Debug, Clone, Serialize)]
pub struct SceneSummary {
    /// Loaded structure, if any.
    pub structure_id: Option<StructureId>,
    /// Centroid removed from the structure.
    pub centroid: Option<[f32; 3]>,
    /// Objects in insertion order.
    pub objects: Vec<ObjectSummary>,
}

/// The authoritative scene. Owns all objects in a flat list.
pub struct Scene {
    /// Objects in insertion order.
    objects: Vec<SceneObject>,
    arena: Option<StructureArena>,
    listeners: FxHashMap<ListenerId, HoverListener>,
    hovered: Option<ObjectId>,
    next_id: u64,
    /// Monotonically increasing generation; bumped on any mutation.
    generation: u64,
    /// Generation that was last consumed by the renderer.
    rendered_generation: u64,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("objects", &self.objects.len())
            .field("arena", &self.arena)
            .field("listeners", &self.listeners.len())
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self {
            objects: Vec::new(),
            arena: None,
            listeners: FxHashMap::default(),
            hovered: None,
            next_id: 0,
            generation: 0,
            rendered_generation: 0,
        }
    }

    // -- Mutation helpers --

    fn invalidate(&mut self) {
        self.generation += 1;
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Whether scene data changed since last `mark_rendered()`.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.generation != self.rendered_generation
    }

    /// Mark current generation as rendered (call after updating renderers).
    pub fn mark_rendered(&mut self) {
        self.rendered_generation = self.generation;
    }

    /// Current generation counter.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    // -- Object access --

    /// All objects in insertion order.
    #[must_use]
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    /// Look up one object.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.id == id)
    }

    /// Number of structure-tagged objects.
    #[must_use]
    pub fn tagged_count(&self) -> usize {
        self.objects.iter().filter(|o| o.tags.structure).count()
    }

    /// The currently loaded structure, if any.
    #[must_use]
    pub fn structure(&self) -> Option<&StructureArena> {
        self.arena.as_ref()
    }

    /// The surface envelope object, if one was built.
    #[must_use]
    pub fn surface(&self) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.tags.surface)
    }

    /// Add an application object that is not owned by any structure.
    pub fn add_object(
        &mut self,
        mesh: Arc<Mesh>,
        material: Material,
        position: Vec3,
    ) -> ObjectId {
        let id = ObjectId(self.allocate_id());
        self.objects.push(SceneObject {
            id,
            kind: ObjectKind::External,
            tags: ObjectTags::default(),
            mesh,
            material,
            position,
            visible: true,
            residue: None,
            pick_radius: None,
        });
        self.invalidate();
        id
    }

    /// Remove one object. Returns whether it existed.
    pub fn remove_object(&mut self, id: ObjectId) -> bool {
        let before = self.objects.len();
        self.objects.retain(|o| o.id != id);
        if self.objects.len() == before {
            return false;
        }
        if let Some(arena) = &mut self.arena {
            arena.objects.retain(|o| *o != id);
        }
        if self.hovered == Some(id) {
            self.hovered = None;
        }
        self.invalidate();
        true
    }

    /// Toggle visibility. Returns whether the object exists.
    pub fn set_visible(&mut self, id: ObjectId, visible: bool) -> bool {
        let Some(obj) = self.objects.iter_mut().find(|o| o.id == id) else {
            return false;
        };
        if obj.visible != visible {
            obj.visible = visible;
            self.invalidate();
        }
        true
    }

    /// Show or hide the surface envelope by switching its opacity between
    /// `opacity` and zero. Returns whether a surface exists.
    pub fn set_surface_visible(&mut self, visible: bool, opacity: f32) -> bool {
        let Some(obj) = self.objects.iter_mut().find(|o| o.tags.surface) else {
            return false;
        };
        obj.material.opacity = if visible { opacity.clamp(0.0, 1.0) } else { 0.0 };
        self.invalidate();
        true
    }

    // -- Structure lifecycle --

    /// Replace the current structure with `geometry`.
    ///
    /// Releases the previous arena first, then inserts every
    /// representation translated by `-centroid` and tagged as
    /// structure-owned.
    pub fn assemble(
        &mut self,
        structure_id: StructureId,
        geometry: SynthesizedGeometry,
        centroid: Vec3,
    ) -> AssemblySummary {
        let released = self.release_structure();
        let mut arena = StructureArena {
            structure_id,
            centroid,
            objects: Vec::with_capacity(geometry.object_count()),
            listeners: Vec::new(),
        };
        let structure_tags = ObjectTags {
            structure: true,
            surface: false,
        };

        for trace in geometry.backbone {
            let obj = self.structure_object(
                ObjectKind::Backbone,
                structure_tags,
                Arc::new(trace.mesh),
                trace.material,
                -centroid,
            );
            arena.objects.push(obj);
        }
        for ribbon in geometry.ribbons {
            let obj = self.structure_object(
                ObjectKind::Ribbon,
                structure_tags,
                Arc::new(ribbon.mesh),
                ribbon.material,
                -centroid,
            );
            arena.objects.push(obj);
        }
        for marker in geometry.markers {
            let obj = self.structure_object(
                ObjectKind::ResidueMarker,
                structure_tags,
                marker.mesh,
                marker.material,
                marker.center - centroid,
            );
            if let Some(last) = self.objects.last_mut() {
                last.residue = Some(marker.tag);
                last.pick_radius = Some(marker.radius);
            }
            arena.objects.push(obj);
        }
        if let Some(surface) = geometry.surface {
            let obj = self.structure_object(
                ObjectKind::Surface,
                ObjectTags {
                    structure: true,
                    surface: true,
                },
                Arc::new(surface.mesh),
                surface.material,
                -centroid,
            );
            arena.objects.push(obj);
        }

        let inserted = arena.objects.len();
        log::info!(
            "assembled {} ({inserted} objects, released {})",
            arena.structure_id,
            released.objects
        );
        self.arena = Some(arena);
        self.invalidate();
        AssemblySummary { released, inserted }
    }

    fn structure_object(
        &mut self,
        kind: ObjectKind,
        tags: ObjectTags,
        mesh: Arc<Mesh>,
        material: Material,
        position: Vec3,
    ) -> ObjectId {
        let id = ObjectId(self.allocate_id());
        self.objects.push(SceneObject {
            id,
            kind,
            tags,
            mesh,
            material,
            position,
            visible: true,
            residue: None,
            pick_radius: None,
        });
        id
    }

    /// Drop every structure-tagged object and every listener owned by the
    /// current structure.
    pub fn release_structure(&mut self) -> ReleaseSummary {
        let Some(arena) = self.arena.take() else {
            return ReleaseSummary::default();
        };
        let before = self.objects.len();
        self.objects.retain(|o| !o.tags.structure);
        let mut listeners = 0;
        for id in &arena.listeners {
            if self.listeners.remove(id).is_some() {
                listeners += 1;
            }
        }
        self.hovered = None;
        self.invalidate();
        log::debug!("released {}", arena.structure_id);
        ReleaseSummary {
            objects: before - self.objects.len(),
            listeners,
        }
    }

    // -- Listeners --

    /// Register a hover listener owned by the current structure. Returns
    /// `None` when no structure is loaded.
    pub fn attach_hover_listener(
        &mut self,
        listener: impl FnMut(Option<&ResidueInfo>) + Send + 'static,
    ) -> Option<ListenerId> {
        let id = ListenerId(self.next_id);
        let arena = self.arena.as_mut()?;
        arena.listeners.push(id);
        self.next_id += 1;
        let _ = self.listeners.insert(id, Box::new(listener));
        Some(id)
    }

    /// Detach a listener early. Returns whether it was attached.
    pub fn detach_listener(&mut self, id: ListenerId) -> bool {
        if let Some(arena) = &mut self.arena {
            arena.listeners.retain(|l| *l != id);
        }
        self.listeners.remove(&id).is_some()
    }

    /// Number of attached listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    fn notify(&mut self, info: Option<&ResidueInfo>) {
        let mut ids: Vec<ListenerId> = self.listeners.keys().copied().collect();
        ids.sort_unstable();
        for id in ids {
            if let Some(listener) = self.listeners.get_mut(&id) {
                listener(info);
            }
        }
    }

    // -- Export --

    /// Serializable snapshot without mesh data.
    #[must_use]
    pub fn summary(&self) -> SceneSummary {
        SceneSummary {
            structure_id: self.arena.as_ref().map(|a| a.structure_id.clone()),
            centroid: self.arena.as_ref().map(|a| a.centroid.to_array()),
            objects: self
                .objects
                .iter()
                .map(|o| ObjectSummary {
                    id: o.id,
                    kind: o.kind,
                    tags: o.tags,
                    position: o.position.to_array(),
                    visible: o.visible,
                    vertices: o.mesh.vertices.len(),
                    triangles: o.mesh.triangle_count(),
                    fingerprint: o.mesh.fingerprint(),
                    material: o.material,
                    residue: o.residue.clone(),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::geometry::synthesize;
    use crate::options::{
        ColorOptions, DisplayOptions, GeometryOptions, ParseOptions,
    };
    use crate::structure::{parse_pdb, test_data, BindingSite, Structure};

    pub(crate) fn assemble_text(scene: &mut Scene, id: &str, text: &str) -> Structure {
        let s = parse_pdb(text, &ParseOptions::default()).unwrap();
        let geometry = synthesize(
            &s,
            &[BindingSite::new("site", "GLU2")],
            &GeometryOptions::default(),
            &ColorOptions::default(),
            &DisplayOptions::default(),
        );
        let centroid = s.centroid().unwrap();
        let _ = scene.assemble(StructureId::new(id).unwrap(), geometry, centroid);
        s
    }

    fn small_pdb() -> String {
        [
            test_data::atom_line(1, "CA", "ALA", 'A', 1, [0.0, 0.0, 0.0]),
            test_data::atom_line(2, "CA", "GLY", 'A', 2, [3.8, 0.0, 0.0]),
        ]
        .join("\n")
    }

    #[test]
    fn assembly_centers_and_tags() {
        let mut scene = Scene::new();
        let s = assemble_text(&mut scene, "1ABC", &test_data::two_chain_pdb());
        let centroid = s.centroid().unwrap();

        assert_eq!(scene.tagged_count(), scene.objects().len());
        let surface = scene.surface().unwrap();
        assert!(surface.tags.structure);
        assert_eq!(surface.material.opacity, 0.0);
        assert_eq!(
            scene.objects().iter().filter(|o| o.tags.surface).count(),
            1
        );

        let marker = scene
            .objects()
            .iter()
            .find(|o| o.kind == ObjectKind::ResidueMarker)
            .unwrap();
        let first_ca = s.alpha_carbons().next().unwrap().position;
        assert!((marker.position - (first_ca - centroid)).length() < 1e-5);
        assert_eq!(marker.residue.as_ref().unwrap().label, "MET1");

        let backbone = scene
            .objects()
            .iter()
            .find(|o| o.kind == ObjectKind::Backbone)
            .unwrap();
        assert_eq!(backbone.position, -centroid);
    }

    #[test]
    fn reload_leaves_only_new_objects() {
        let mut scene = Scene::new();
        let external = scene.add_object(
            Arc::new(Mesh::default()),
            Material::new(0, 0.5, 0.0),
            Vec3::ZERO,
        );
        let _ = assemble_text(&mut scene, "1ABC", &test_data::two_chain_pdb());
        let first_ids: Vec<ObjectId> = scene
            .objects()
            .iter()
            .filter(|o| o.tags.structure)
            .map(|o| o.id)
            .collect();

        let s = parse_pdb(&small_pdb(), &ParseOptions::default()).unwrap();
        let geometry = synthesize(
            &s,
            &[],
            &GeometryOptions::default(),
            &ColorOptions::default(),
            &DisplayOptions::default(),
        );
        let expected = geometry.object_count();
        let summary =
            scene.assemble(StructureId::new("2XYZ").unwrap(), geometry, s.centroid().unwrap());

        assert_eq!(summary.released.objects, first_ids.len());
        assert_eq!(summary.inserted, expected);
        assert_eq!(scene.tagged_count(), expected);
        assert!(first_ids.iter().all(|id| scene.object(*id).is_none()));
        // Application objects survive reloads.
        assert!(scene.object(external).is_some());
        assert_eq!(scene.structure().unwrap().structure_id.as_str(), "2XYZ");
    }

    #[test]
    fn release_detaches_listeners() {
        let mut scene = Scene::new();
        assert!(scene.attach_hover_listener(|_| {}).is_none());

        let _ = assemble_text(&mut scene, "1ABC", &test_data::two_chain_pdb());
        let _ = scene.attach_hover_listener(|_| {}).unwrap();
        let _ = scene.attach_hover_listener(|_| {}).unwrap();
        assert_eq!(scene.listener_count(), 2);

        // Replacing the structure releases its listeners too.
        let _ = assemble_text(&mut scene, "2XYZ", &small_pdb());
        assert_eq!(scene.listener_count(), 0);

        let id = scene.attach_hover_listener(|_| {}).unwrap();
        assert!(scene.detach_listener(id));
        assert!(!scene.detach_listener(id));

        let _ = scene.attach_hover_listener(|_| {}).unwrap();
        let released = scene.release_structure();
        assert_eq!(released.listeners, 1);
        assert_eq!(scene.listener_count(), 0);
        assert_eq!(scene.tagged_count(), 0);
        assert!(scene.structure().is_none());
    }

    #[test]
    fn repeated_reloads_do_not_accumulate() {
        let mut scene = Scene::new();
        let calls = Arc::new(AtomicUsize::new(0));
        for _ in 0..5 {
            let _ = assemble_text(&mut scene, "1ABC", &test_data::two_chain_pdb());
            let calls = Arc::clone(&calls);
            let _ = scene.attach_hover_listener(move |_| {
                let _ = calls.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert_eq!(scene.listener_count(), 1);
        assert_eq!(scene.tagged_count(), 10);
        scene.notify(None);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn surface_toggle() {
        let mut scene = Scene::new();
        assert!(!scene.set_surface_visible(true, 0.4));
        let _ = assemble_text(&mut scene, "1ABC", &test_data::two_chain_pdb());
        scene.mark_rendered();
        assert!(scene.set_surface_visible(true, 0.4));
        assert!(scene.is_dirty());
        assert_eq!(scene.surface().unwrap().material.opacity, 0.4);
        assert!(scene.set_surface_visible(false, 0.4));
        assert_eq!(scene.surface().unwrap().material.opacity, 0.0);
    }

    #[test]
    fn summary_serializes() {
        let mut scene = Scene::new();
        let _ = assemble_text(&mut scene, "1ABC", &test_data::two_chain_pdb());
        let json = serde_json::to_value(scene.summary()).unwrap();
        assert_eq!(json["structure_id"], "1ABC");
        let objects = json["objects"].as_array().unwrap();
        assert_eq!(objects.len(), scene.objects().len());
        assert!(objects.iter().any(|o| o["kind"] == "surface"));
        assert!(objects
            .iter()
            .any(|o| o["residue"]["label"] == "GLU2"
                && o["residue"]["is_binding_site"] == true));
    }

    #[test]
    fn summary_fingerprints_track_geometry() {
        let backbone_digest = |scene: &Scene| {
            scene
                .summary()
                .objects
                .iter()
                .find(|o| o.kind == ObjectKind::Backbone)
                .map(|o| o.fingerprint)
        };
        let mut scene = Scene::new();
        let _ = assemble_text(&mut scene, "1ABC", &test_data::two_chain_pdb());
        let first = backbone_digest(&scene);
        assert!(first.is_some());

        let _ = assemble_text(&mut scene, "1ABC", &test_data::two_chain_pdb());
        assert_eq!(backbone_digest(&scene), first);

        let _ = assemble_text(&mut scene, "2XYZ", &small_pdb());
        assert_ne!(backbone_digest(&scene), first);
    }
}
