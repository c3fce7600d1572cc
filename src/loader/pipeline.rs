//! Parse, synthesize and assemble one fetched structure.

use serde::Serialize;

use super::LoadState;
use crate::error::BindviewError;
use crate::geometry::synthesize;
use crate::options::Options;
use crate::scene::Scene;
use crate::structure::{parse_pdb, BindingSite, StructureId};
use crate::util::timing::StageTimings;

/// What a completed load produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadSummary {
    /// Loaded structure.
    pub structure_id: StructureId,
    /// Atoms kept by the parser.
    pub atoms: usize,
    /// Residues with an alpha carbon.
    pub residues: usize,
    /// Chain identifiers in file order.
    pub chains: Vec<String>,
    /// Secondary-structure segments.
    pub segments: usize,
    /// Malformed `ATOM` lines skipped.
    pub skipped_lines: usize,
    /// Whether the skip ratio crossed the warning threshold.
    pub skip_warning: bool,
    /// Objects inserted into the scene.
    pub objects: usize,
    /// Objects released from the previous structure.
    pub released: usize,
    /// Representation pieces omitted, as display text.
    pub degraded: Vec<String>,
    /// Per-stage durations, fetch included.
    pub timings: StageTimings,
}

/// Run the synchronous half of a load against `text`.
///
/// `on_stage` observes each state entered. On error nothing has touched
/// `scene` yet; releasing the old structure is the caller's job.
pub(crate) fn build_scene(
    id: &StructureId,
    text: &str,
    sites: &[BindingSite],
    options: &Options,
    scene: &mut Scene,
    mut timings: StageTimings,
    mut on_stage: impl FnMut(LoadState),
) -> Result<LoadSummary, BindviewError> {
    on_stage(LoadState::Parsing);
    let structure = timings.time("parse", || parse_pdb(text, &options.parse))?;
    let report = &structure.report;
    // parse_pdb guarantees at least one atom
    let centroid = structure.centroid().unwrap_or_default();

    on_stage(LoadState::Synthesizing);
    let geometry = timings.time("synthesize", || {
        synthesize(
            &structure,
            sites,
            &options.geometry,
            &options.colors,
            &options.display,
        )
    });
    let degraded = geometry
        .degraded
        .iter()
        .map(|d| format!("{:?} {}: {}", d.representation, d.subject, d.error))
        .collect();

    on_stage(LoadState::Assembling);
    let assembled =
        timings.time("assemble", || scene.assemble(id.clone(), geometry, centroid));

    log::info!("{id} ready ({timings})");
    Ok(LoadSummary {
        structure_id: id.clone(),
        atoms: structure.atoms.len(),
        residues: structure.residue_count(),
        chains: structure
            .chain_ids()
            .into_iter()
            .map(str::to_owned)
            .collect(),
        segments: structure.segments.len(),
        skipped_lines: report.skipped.len(),
        skip_warning: report.exceeds_skip_threshold(),
        objects: assembled.inserted,
        released: assembled.released.objects,
        degraded,
        timings,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::test_data;

    fn id() -> StructureId {
        StructureId::new("1ABC").unwrap()
    }

    #[test]
    fn stages_are_visited_in_order() {
        let mut scene = Scene::new();
        let mut stages = Vec::new();
        let summary = build_scene(
            &id(),
            &test_data::two_chain_pdb(),
            &[BindingSite::new("site", "GLU2")],
            &Options::default(),
            &mut scene,
            StageTimings::default(),
            |s| stages.push(s),
        )
        .unwrap();

        assert_eq!(
            stages,
            vec![LoadState::Parsing, LoadState::Synthesizing, LoadState::Assembling]
        );
        assert_eq!(summary.chains, vec!["A".to_owned(), "B".to_owned()]);
        assert_eq!(summary.residues, 7);
        assert_eq!(summary.objects, scene.tagged_count());
        assert!(summary.timings.get("parse").is_some());
        assert!(summary.timings.get("assemble").is_some());
        assert!(!summary.skip_warning);
    }

    #[test]
    fn parse_failure_leaves_scene_untouched() {
        let mut scene = Scene::new();
        let before = scene.generation();
        let mut stages = Vec::new();
        let err = build_scene(
            &id(),
            "HEADER    nothing here\n",
            &[],
            &Options::default(),
            &mut scene,
            StageTimings::default(),
            |s| stages.push(s),
        )
        .unwrap_err();

        assert!(matches!(err, BindviewError::Parse(_)));
        assert_eq!(stages, vec![LoadState::Parsing]);
        assert_eq!(scene.generation(), before);
        assert!(scene.structure().is_none());
    }

    #[test]
    fn heavy_skipping_is_flagged() {
        let text = [
            test_data::atom_line(1, "CA", "ALA", 'A', 1, [0.0; 3]),
            "ATOM      2  CA  GLY A   2     garbage".to_owned(),
        ]
        .join("\n");
        let summary = build_scene(
            &id(),
            &text,
            &[],
            &Options::default(),
            &mut Scene::new(),
            StageTimings::default(),
            |_| {},
        )
        .unwrap();
        assert_eq!(summary.skipped_lines, 1);
        assert!(summary.skip_warning);
        assert!(!summary.degraded.is_empty());
    }
}
