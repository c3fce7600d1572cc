//! Parsed structure data: atoms, secondary-structure segments, binding
//! sites, and the sources that provide raw structure text.
//!
//! Everything here is produced once per load and is immutable afterwards.
//! The geometry builders in [`crate::geometry`] only ever read it.

mod binding;
mod id;
mod parse;
mod source;

pub use binding::{load_binding_sites, BindingSite};
pub use id::StructureId;
pub use parse::{parse_pdb, ParseError, ParseReport, SkippedLine};
#[cfg(feature = "fetch")]
pub use source::HttpSource;
pub use source::{
    default_source, CachingSource, DirectorySource, FallbackSource,
    FetchError, StructureSource,
};
#[cfg(test)]
pub(crate) use source::mock;

use glam::Vec3;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

/// Atom name of the alpha carbon, the per-residue representative.
pub const ALPHA_CARBON: &str = "CA";

/// One `ATOM` record.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Atom serial number, unique within the file.
    pub serial: i32,
    /// Atom name (e.g. "CA").
    pub name: String,
    /// Alternate location indicator, if any.
    pub alt_loc: Option<char>,
    /// Three-letter residue name.
    pub res_name: String,
    /// Chain identifier (may be empty for chainless files).
    pub chain_id: String,
    /// Residue sequence number, unique only within a chain.
    pub res_seq: i32,
    /// Insertion code distinguishing residues that share a number.
    pub insertion_code: Option<char>,
    /// Cartesian position in angstroms. Always finite.
    pub position: Vec3,
    /// Occupancy, when present and numeric.
    pub occupancy: Option<f32>,
    /// Temperature factor, when present and numeric.
    pub temp_factor: Option<f32>,
    /// Element symbol.
    pub element: String,
    /// Formal charge text (e.g. "1+").
    pub charge: String,
}

impl Atom {
    /// Whether this is a backbone alpha carbon.
    #[must_use]
    pub fn is_alpha_carbon(&self) -> bool {
        self.name == ALPHA_CARBON
    }

    /// Residue label in key-residue notation, e.g. `GLU484` or `GLY52A`.
    #[must_use]
    pub fn residue_label(&self) -> String {
        match self.insertion_code {
            Some(code) => format!("{}{}{code}", self.res_name, self.res_seq),
            None => format!("{}{}", self.res_name, self.res_seq),
        }
    }
}

/// Secondary structure classification.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SecondaryStructureKind {
    /// Alpha helix (HELIX record).
    Helix,
    /// Beta strand (SHEET record).
    Sheet,
    /// Turn.
    Turn,
    /// Anything outside an annotated segment.
    Coil,
}

impl SecondaryStructureKind {
    /// Lower-case label used as the color table key.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Helix => "helix",
            Self::Sheet => "sheet",
            Self::Turn => "turn",
            Self::Coil => "coil",
        }
    }
}

/// One `HELIX` or `SHEET` record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondaryStructureSegment {
    /// Helix or sheet.
    pub kind: SecondaryStructureKind,
    /// Chain of the first residue.
    pub start_chain: String,
    /// First residue number (inclusive).
    pub start_res: i32,
    /// Chain of the last residue.
    pub end_chain: String,
    /// Last residue number (inclusive).
    pub end_res: i32,
}

impl SecondaryStructureSegment {
    /// Whether the segment starts and ends on different chains.
    #[must_use]
    pub fn is_cross_chain(&self) -> bool {
        self.start_chain != self.end_chain
    }

    /// Whether a residue on `chain` numbered `res_seq` lies inside the
    /// segment. Cross-chain segments contain nothing.
    #[must_use]
    pub fn contains(&self, chain: &str, res_seq: i32) -> bool {
        !self.is_cross_chain()
            && self.start_chain == chain
            && (self.start_res..=self.end_res).contains(&res_seq)
    }
}

/// A parsed structure file.
#[derive(Debug, Clone)]
pub struct Structure {
    /// Atoms in file order.
    pub atoms: Vec<Atom>,
    /// Secondary-structure segments in file order.
    pub segments: Vec<SecondaryStructureSegment>,
    /// What the parser skipped along the way.
    pub report: ParseReport,
}

impl Structure {
    /// Alpha-carbon atoms in file order.
    pub fn alpha_carbons(&self) -> impl Iterator<Item = &Atom> {
        self.atoms.iter().filter(|a| a.is_alpha_carbon())
    }

    /// Arithmetic mean of all atom positions, `None` for an empty
    /// structure.
    #[must_use]
    pub fn centroid(&self) -> Option<Vec3> {
        if self.atoms.is_empty() {
            return None;
        }
        let sum = self
            .atoms
            .iter()
            .fold(glam::DVec3::ZERO, |acc, a| acc + a.position.as_dvec3());
        Some((sum / self.atoms.len() as f64).as_vec3())
    }

    /// Chain identifiers in order of first appearance.
    #[must_use]
    pub fn chain_ids(&self) -> Vec<&str> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut ids = Vec::new();
        for atom in &self.atoms {
            if seen.insert(atom.chain_id.as_str()) {
                ids.push(atom.chain_id.as_str());
            }
        }
        ids
    }

    /// Alpha carbons grouped by chain (first-appearance order), each
    /// group sorted by residue number.
    #[must_use]
    pub fn alpha_carbons_by_chain(&self) -> Vec<(&str, Vec<&Atom>)> {
        let mut index: FxHashMap<&str, usize> = FxHashMap::default();
        let mut groups: Vec<(&str, Vec<&Atom>)> = Vec::new();
        for atom in self.alpha_carbons() {
            let slot = *index.entry(atom.chain_id.as_str()).or_insert_with(|| {
                groups.push((atom.chain_id.as_str(), Vec::new()));
                groups.len() - 1
            });
            groups[slot].1.push(atom);
        }
        for (_, atoms) in &mut groups {
            atoms.sort_by_key(|a| a.res_seq);
        }
        groups
    }

    /// Secondary-structure kind of a residue: the first segment that
    /// contains it, or [`SecondaryStructureKind::Coil`].
    #[must_use]
    pub fn secondary_structure_at(
        &self,
        chain: &str,
        res_seq: i32,
    ) -> SecondaryStructureKind {
        self.segments
            .iter()
            .find(|s| s.contains(chain, res_seq))
            .map_or(SecondaryStructureKind::Coil, |s| s.kind)
    }

    /// Number of residues, counted by alpha carbons.
    #[must_use]
    pub fn residue_count(&self) -> usize {
        self.alpha_carbons().count()
    }
}

#[cfg(test)]
pub(crate) mod test_data {
    //! Small hand-written PDB fixtures shared by tests across the crate.

    /// Format one fixed-column ATOM line.
    pub(crate) fn atom_line(
        serial: i32,
        name: &str,
        res_name: &str,
        chain: char,
        res_seq: i32,
        xyz: [f32; 3],
    ) -> String {
        format!(
            "ATOM  {serial:>5} {name:<4} {res_name:>3} {chain}{res_seq:>4}    {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}  ",
            xyz[0],
            xyz[1],
            xyz[2],
            1.0,
            20.0,
            &name[..1],
        )
    }

    /// HELIX record spanning `start..=end` on `chain`.
    pub(crate) fn helix_line(chain: char, start: i32, end: i32) -> String {
        format!(
            "HELIX    1   1 GLU {chain} {start:>4}  LYS {chain} {end:>4}  1{:>36}",
            ""
        )
    }

    /// SHEET record spanning `start..=end` on `chain`.
    pub(crate) fn sheet_line(chain: char, start: i32, end: i32) -> String {
        format!(
            "SHEET    1   A 2 VAL {chain}{start:>4}  ILE {chain}{end:>4}  0{:>40}",
            ""
        )
    }

    /// Two chains: A with six residues along a gentle helix-like curve and
    /// a HELIX over 2..=5, B with a single residue.
    pub(crate) fn two_chain_pdb() -> String {
        let residues = ["MET", "GLU", "LYS", "PHE", "GLU", "TRP"];
        let mut lines = vec![
            "HEADER    TEST STRUCTURE".to_owned(),
            helix_line('A', 2, 5),
        ];
        let mut serial = 1;
        for (i, res) in residues.iter().enumerate() {
            let t = i as f32;
            let ca = [2.3 * t.cos(), 2.3 * t.sin(), 1.5 * t];
            lines.push(atom_line(serial, "N", res, 'A', i as i32 + 1, [
                ca[0] - 1.0,
                ca[1],
                ca[2],
            ]));
            serial += 1;
            lines.push(atom_line(serial, "CA", res, 'A', i as i32 + 1, ca));
            serial += 1;
        }
        lines.push(atom_line(serial, "CA", "GLY", 'B', 1, [10.0, 0.0, 0.0]));
        lines.push("END".to_owned());
        lines.join("\n")
    }
}
