use std::sync::Arc;

use super::{uv_sphere, Material, ResidueMarker, ResidueTag};
use crate::options::{ColorOptions, DisplayOptions, GeometryOptions};
use crate::structure::{BindingSite, Structure};

const ROUGHNESS: f32 = 0.3;
const SITE_METALNESS: f32 = 0.7;
const METALNESS: f32 = 0.4;
const SITE_GLOW: f32 = 0.3;

/// One sphere per alpha carbon, in file order.
///
/// A residue is a binding-site member when any site's key-residue text
/// contains its `{resName}{resSeq}` label. Members get the larger radius,
/// the highlight color and a glow, unless highlighting is switched off in
/// `display`.
pub fn build_markers(
    structure: &Structure,
    sites: &[BindingSite],
    geometry: &GeometryOptions,
    colors: &ColorOptions,
    display: &DisplayOptions,
) -> Vec<ResidueMarker> {
    let plain_mesh = Arc::new(uv_sphere(geometry.marker_radius, geometry.sphere_segments));
    let site_mesh = Arc::new(uv_sphere(
        geometry.binding_marker_radius,
        geometry.sphere_segments,
    ));
    let site_rgb = colors.binding_site_rgb();

    structure
        .alpha_carbons()
        .map(|atom| {
            let label = atom.residue_label();
            let is_binding_site = BindingSite::any_mentions(sites, &label);
            let highlighted = is_binding_site && display.show_binding_sites;

            let (radius, mesh, material) = if highlighted {
                (
                    geometry.binding_marker_radius,
                    Arc::clone(&site_mesh),
                    Material::new(site_rgb, ROUGHNESS, SITE_METALNESS)
                        .with_emissive(site_rgb, SITE_GLOW),
                )
            } else {
                (
                    geometry.marker_radius,
                    Arc::clone(&plain_mesh),
                    Material::new(
                        colors.residue_color(&atom.res_name),
                        ROUGHNESS,
                        METALNESS,
                    ),
                )
            };

            ResidueMarker {
                tag: ResidueTag {
                    label,
                    res_name: atom.res_name.clone(),
                    res_seq: atom.res_seq,
                    chain: atom.chain_id.clone(),
                    secondary_structure: structure
                        .secondary_structure_at(&atom.chain_id, atom.res_seq),
                    is_binding_site,
                    atom_serial: atom.serial,
                },
                center: atom.position,
                radius,
                mesh,
                material,
            }
        })
        .collect()
}
