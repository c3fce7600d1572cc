use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Parse `#RRGGBB` (leading `#` optional) into `0xRRGGBB`.
#[must_use]
pub fn hex_rgb(text: &str) -> Option<u32> {
    let digits = text.trim().trim_start_matches('#');
    if digits.len() != 6 {
        return None;
    }
    u32::from_str_radix(digits, 16).ok()
}

/// Color tables for structure representations. Colors are `#RRGGBB`
/// strings so TOML presets stay readable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ColorOptions {
    /// Backbone trace color.
    pub backbone: String,
    /// Marker color for binding-site residues.
    pub binding_site: String,
    /// Surface envelope color.
    pub surface: String,
    /// Fallback for residues and structure kinds missing from the tables.
    pub fallback: String,
    /// Per-residue marker color keyed by 3-letter residue name.
    pub residues: HashMap<String, String>,
    /// Ribbon color keyed by secondary-structure label.
    pub structure_kinds: HashMap<String, String>,
}

const RESIDUE_COLORS: [(&str, &str); 21] = [
    ("ALA", "#C8C8C8"),
    ("ARG", "#145AFF"),
    ("ASN", "#00DCDC"),
    ("ASP", "#E60A0A"),
    ("CYS", "#E6E600"),
    ("GLN", "#00DCDC"),
    ("GLU", "#E60A0A"),
    ("GLY", "#EBEBEB"),
    ("HIS", "#8282D2"),
    ("ILE", "#0F820F"),
    ("LEU", "#0F820F"),
    ("LYS", "#145AFF"),
    ("MET", "#E6E600"),
    ("PHE", "#3232AA"),
    ("PRO", "#DC9682"),
    ("SER", "#FA9600"),
    ("THR", "#FA9600"),
    ("TRP", "#B45AB4"),
    ("TYR", "#3232AA"),
    ("VAL", "#0F820F"),
    ("HOH", "#00FFFF"),
];

const STRUCTURE_COLORS: [(&str, &str); 4] = [
    ("helix", "#0F820F"),
    ("sheet", "#4169E1"),
    ("turn", "#FFD700"),
    ("coil", "#778899"),
];

const FALLBACK_RGB: u32 = 0x7F_7F7F;

impl Default for ColorOptions {
    fn default() -> Self {
        let table = |entries: &[(&str, &str)]| {
            entries
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
                .collect::<HashMap<_, _>>()
        };
        Self {
            backbone: "#3949AB".to_owned(),
            binding_site: "#FF5252".to_owned(),
            surface: "#FFFFFF".to_owned(),
            fallback: "#7F7F7F".to_owned(),
            residues: table(&RESIDUE_COLORS),
            structure_kinds: table(&STRUCTURE_COLORS),
        }
    }
}

impl ColorOptions {
    fn fallback_rgb(&self) -> u32 {
        hex_rgb(&self.fallback).unwrap_or(FALLBACK_RGB)
    }

    fn lookup(&self, table: &HashMap<String, String>, key: &str) -> u32 {
        table
            .get(key.trim())
            .and_then(|hex| hex_rgb(hex))
            .unwrap_or_else(|| self.fallback_rgb())
    }

    /// Marker color by 3-letter residue name. Falls back to neutral gray.
    #[must_use]
    pub fn residue_color(&self, res_name: &str) -> u32 {
        self.lookup(&self.residues, res_name)
    }

    /// Ribbon color by secondary-structure label (`helix`, `sheet`, ...).
    #[must_use]
    pub fn structure_color(&self, label: &str) -> u32 {
        self.lookup(&self.structure_kinds, label)
    }

    /// Backbone trace color.
    #[must_use]
    pub fn backbone_rgb(&self) -> u32 {
        hex_rgb(&self.backbone).unwrap_or_else(|| self.fallback_rgb())
    }

    /// Binding-site highlight color.
    #[must_use]
    pub fn binding_site_rgb(&self) -> u32 {
        hex_rgb(&self.binding_site).unwrap_or_else(|| self.fallback_rgb())
    }

    /// Surface envelope color.
    #[must_use]
    pub fn surface_rgb(&self) -> u32 {
        hex_rgb(&self.surface).unwrap_or_else(|| self.fallback_rgb())
    }
}
