use glam::Vec3;

use super::{build_tube, BackboneTrace, Degraded, Material, Representation};
use crate::options::{ColorOptions, GeometryOptions};
use crate::structure::Structure;

const ROUGHNESS: f32 = 0.4;
const METALNESS: f32 = 0.3;

/// One tube per chain through its alpha carbons in residue order.
///
/// Chains with fewer than two alpha carbons produce nothing; that is not
/// an error. Tube construction failures are pushed onto `degraded`.
pub fn build_backbone(
    structure: &Structure,
    geometry: &GeometryOptions,
    colors: &ColorOptions,
    degraded: &mut Vec<Degraded>,
) -> Vec<BackboneTrace> {
    let material = Material::new(colors.backbone_rgb(), ROUGHNESS, METALNESS);
    let mut traces = Vec::new();

    for (chain, atoms) in structure.alpha_carbons_by_chain() {
        if atoms.len() < 2 {
            log::debug!("chain {chain:?}: {} CA, no backbone", atoms.len());
            continue;
        }
        let control: Vec<Vec3> = atoms.iter().map(|a| a.position).collect();
        match build_tube(
            &control,
            geometry.tube_radius,
            geometry.tube_radial_segments as usize,
            geometry.segments_per_span as usize,
        ) {
            Ok(mesh) => traces.push(BackboneTrace {
                chain: chain.to_owned(),
                residue_count: atoms.len(),
                mesh,
                material,
            }),
            Err(error) => degraded.push(Degraded::record(
                Representation::Backbone,
                format!("chain {chain:?}"),
                error,
            )),
        }
    }

    traces
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::ParseOptions;
    use crate::structure::{parse_pdb, test_data};
    use crate::util::hash::hash_vec3_slices;

    fn build(text: &str) -> (Vec<BackboneTrace>, Vec<Degraded>) {
        let s = parse_pdb(text, &ParseOptions::default()).unwrap();
        let mut degraded = Vec::new();
        let traces = build_backbone(
            &s,
            &GeometryOptions::default(),
            &ColorOptions::default(),
            &mut degraded,
        );
        (traces, degraded)
    }

    #[test]
    fn one_trace_per_chain_with_two_or_more_ca() {
        let mut lines = vec![
            // Chain A: 3 CA
            test_data::atom_line(1, "CA", "ALA", 'A', 1, [0.0, 0.0, 0.0]),
            test_data::atom_line(2, "CA", "ALA", 'A', 2, [3.8, 0.0, 0.0]),
            test_data::atom_line(3, "CA", "ALA", 'A', 3, [5.0, 3.0, 0.0]),
            // Chain B: exactly 1 CA
            test_data::atom_line(4, "CA", "GLY", 'B', 1, [9.0, 0.0, 0.0]),
            // Chain C: 0 CA
            test_data::atom_line(5, "N", "SER", 'C', 1, [0.0, 9.0, 0.0]),
        ];
        // Chain D: exactly 2 CA
        lines.push(test_data::atom_line(6, "CA", "LYS", 'D', 4, [0.0, 0.0, 9.0]));
        lines.push(test_data::atom_line(7, "CA", "LYS", 'D', 5, [0.0, 3.8, 9.0]));

        let (traces, degraded) = build(&lines.join("\n"));
        let chains: Vec<&str> = traces.iter().map(|t| t.chain.as_str()).collect();
        assert_eq!(chains, vec!["A", "D"]);
        assert!(degraded.is_empty());
        assert_eq!(traces[0].residue_count, 3);
        assert_eq!(traces[0].material.color, 0x39_49AB);
    }

    #[test]
    fn idempotent() {
        let text = test_data::two_chain_pdb();
        let (first, _) = build(&text);
        let (second, _) = build(&text);
        let points = |t: &[BackboneTrace]| -> Vec<Vec<Vec3>> {
            t.iter().map(|b| b.mesh.positions()).collect()
        };
        assert_eq!(points(&first), points(&second));
        assert_eq!(
            hash_vec3_slices(&points(&first)),
            hash_vec3_slices(&points(&second))
        );
    }

    #[test]
    fn curve_follows_residue_order_not_file_order() {
        let text = [
            test_data::atom_line(1, "CA", "ALA", 'A', 3, [7.6, 0.0, 0.0]),
            test_data::atom_line(2, "CA", "ALA", 'A', 1, [0.0, 0.0, 0.0]),
            test_data::atom_line(3, "CA", "ALA", 'A', 2, [3.8, 0.0, 0.0]),
        ]
        .join("\n");
        let (traces, _) = build(&text);
        let positions = traces[0].mesh.positions();
        // First ring surrounds residue 1, last ring surrounds residue 3.
        let ring = GeometryOptions::default().tube_radial_segments as usize;
        let first_ring_center: Vec3 =
            positions[..ring].iter().copied().sum::<Vec3>() / ring as f32;
        let last_ring_center: Vec3 = positions[positions.len() - ring..]
            .iter()
            .copied()
            .sum::<Vec3>()
            / ring as f32;
        assert!(first_ring_center.length() < 1e-4);
        assert!((last_ring_center - Vec3::X * 7.6).length() < 1e-4);
    }

    #[test]
    fn coincident_chain_is_degraded() {
        let text = [
            test_data::atom_line(1, "CA", "ALA", 'A', 1, [1.0, 1.0, 1.0]),
            test_data::atom_line(2, "CA", "ALA", 'A', 2, [1.0, 1.0, 1.0]),
        ]
        .join("\n");
        let (traces, degraded) = build(&text);
        assert!(traces.is_empty());
        assert_eq!(degraded.len(), 1);
        assert_eq!(degraded[0].representation, Representation::Backbone);
    }
}
