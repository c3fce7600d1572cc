use glam::Vec3;

use super::{build_tube, Degraded, Material, Representation, Ribbon};
use crate::options::{ColorOptions, GeometryOptions};
use crate::structure::{SecondaryStructureKind, Structure};

const ROUGHNESS: f32 = 0.4;
const METALNESS: f32 = 0.3;

/// One tube per secondary-structure segment through the alpha carbons it
/// covers.
///
/// Segments covering fewer than two alpha carbons are skipped silently.
/// Cross-chain segments are skipped as well; their residue range has no
/// meaning on a single chain.
pub fn build_ribbons(
    structure: &Structure,
    geometry: &GeometryOptions,
    colors: &ColorOptions,
    degraded: &mut Vec<Degraded>,
) -> Vec<Ribbon> {
    let by_chain = structure.alpha_carbons_by_chain();
    let mut ribbons = Vec::new();

    for segment in &structure.segments {
        let subject = format!(
            "{} {}{}-{}{}",
            segment.kind.label(),
            segment.start_chain,
            segment.start_res,
            segment.end_chain,
            segment.end_res
        );
        if segment.is_cross_chain() {
            log::debug!("{subject}: spans chains, no ribbon");
            continue;
        }

        let control: Vec<Vec3> = by_chain
            .iter()
            .find(|(chain, _)| *chain == segment.start_chain)
            .map(|(_, atoms)| {
                atoms
                    .iter()
                    .filter(|a| segment.contains(&a.chain_id, a.res_seq))
                    .map(|a| a.position)
                    .collect()
            })
            .unwrap_or_default();
        if control.len() < 2 {
            log::debug!("{subject}: {} CA, no ribbon", control.len());
            continue;
        }

        let radius = match segment.kind {
            SecondaryStructureKind::Helix => geometry.helix_radius,
            _ => geometry.strand_radius,
        };
        let material = Material::new(
            colors.structure_color(segment.kind.label()),
            ROUGHNESS,
            METALNESS,
        );

        match build_tube(
            &control,
            radius,
            geometry.tube_radial_segments as usize,
            geometry.segments_per_span as usize,
        ) {
            Ok(mesh) => ribbons.push(Ribbon {
                kind: segment.kind,
                chain: segment.start_chain.clone(),
                start_res: segment.start_res,
                end_res: segment.end_res,
                radius,
                mesh,
                material,
            }),
            Err(error) => {
                degraded.push(Degraded::record(Representation::Ribbon, subject, error));
            }
        }
    }

    ribbons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParseOptions;
    use crate::structure::{parse_pdb, test_data, SecondaryStructureSegment};

    fn structure() -> Structure {
        parse_pdb(&test_data::two_chain_pdb(), &ParseOptions::default()).unwrap()
    }

    fn build(s: &Structure) -> Vec<Ribbon> {
        let mut degraded = Vec::new();
        let ribbons = build_ribbons(
            s,
            &GeometryOptions::default(),
            &ColorOptions::default(),
            &mut degraded,
        );
        assert!(degraded.is_empty());
        ribbons
    }

    fn segment(
        kind: SecondaryStructureKind,
        start: (&str, i32),
        end: (&str, i32),
    ) -> SecondaryStructureSegment {
        SecondaryStructureSegment {
            kind,
            start_chain: start.0.to_owned(),
            start_res: start.1,
            end_chain: end.0.to_owned(),
            end_res: end.1,
        }
    }

    #[test]
    fn helix_is_thicker_and_green() {
        let mut s = structure();
        s.segments.push(segment(
            SecondaryStructureKind::Sheet,
            ("A", 1),
            ("A", 2),
        ));
        let ribbons = build(&s);
        assert_eq!(ribbons.len(), 2);

        let helix = &ribbons[0];
        assert_eq!(helix.kind, SecondaryStructureKind::Helix);
        assert_eq!(helix.material.color, 0x0F_820F);
        let sheet = &ribbons[1];
        assert_eq!(sheet.material.color, 0x41_69E1);
        assert!(helix.radius > sheet.radius);

        // Helix spans residues 2..=5: 4 CA, 3 spans.
        let geo = GeometryOptions::default();
        let rings = 3 * geo.segments_per_span as usize + 1;
        assert_eq!(
            helix.mesh.vertices.len(),
            rings * geo.tube_radial_segments as usize
        );
    }

    #[test]
    fn short_segments_are_skipped() {
        let mut s = structure();
        s.segments.clear();
        s.segments.push(segment(
            SecondaryStructureKind::Helix,
            ("A", 6),
            ("A", 9),
        ));
        s.segments.push(segment(
            SecondaryStructureKind::Sheet,
            ("B", 1),
            ("B", 1),
        ));
        s.segments.push(segment(
            SecondaryStructureKind::Sheet,
            ("Z", 1),
            ("Z", 10),
        ));
        assert!(build(&s).is_empty());
    }

    #[test]
    fn cross_chain_segment_produces_no_ribbon() {
        let mut s = structure();
        s.segments.clear();
        s.segments.push(segment(
            SecondaryStructureKind::Sheet,
            ("A", 1),
            ("B", 1),
        ));
        assert!(build(&s).is_empty());
    }

    #[test]
    fn turn_has_its_own_color() {
        let mut s = structure();
        s.segments.clear();
        s.segments.push(segment(
            SecondaryStructureKind::Turn,
            ("A", 1),
            ("A", 3),
        ));
        let ribbons = build(&s);
        assert_eq!(ribbons[0].material.color, 0xFF_D700);
    }
}
