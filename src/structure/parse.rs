//! Fixed-column PDB text parsing.
//!
//! Only `ATOM`, `HELIX`, `SHEET`, `MODEL` and `ENDMDL` records are
//! interpreted. Malformed `ATOM` rows are skipped and counted rather than
//! producing non-finite coordinates.

use std::fmt;
use std::ops::Range;

use glam::Vec3;
use rustc_hash::FxHashSet;

use super::{Atom, SecondaryStructureKind, SecondaryStructureSegment, Structure};
use crate::options::ParseOptions;

// ATOM columns (0-indexed, half-open)
const SERIAL: Range<usize> = 6..11;
const NAME: Range<usize> = 12..16;
const ALT_LOC: Range<usize> = 16..17;
const RES_NAME: Range<usize> = 17..20;
const CHAIN: Range<usize> = 21..22;
const RES_SEQ: Range<usize> = 22..26;
const I_CODE: Range<usize> = 26..27;
const X: Range<usize> = 30..38;
const Y: Range<usize> = 38..46;
const Z: Range<usize> = 46..54;
const OCCUPANCY: Range<usize> = 54..60;
const TEMP_FACTOR: Range<usize> = 60..66;
const ELEMENT: Range<usize> = 76..78;
const CHARGE: Range<usize> = 78..80;

/// Column layout of one secondary-structure record type.
struct SegmentColumns {
    start_chain: Range<usize>,
    start_res: Range<usize>,
    end_chain: Range<usize>,
    end_res: Range<usize>,
}

const HELIX_COLUMNS: SegmentColumns = SegmentColumns {
    start_chain: 19..20,
    start_res: 21..25,
    end_chain: 31..32,
    end_res: 33..37,
};

const SHEET_COLUMNS: SegmentColumns = SegmentColumns {
    start_chain: 21..22,
    start_res: 22..26,
    end_chain: 32..33,
    end_res: 33..37,
};

/// Fatal parse failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Input contained no usable `ATOM` records.
    NoAtoms {
        /// Number of `ATOM` lines seen (all of them skipped).
        atom_lines: usize,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAtoms { atom_lines: 0 } => {
                write!(f, "no ATOM records found")
            }
            Self::NoAtoms { atom_lines } => {
                write!(f, "all {atom_lines} ATOM records were malformed")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// A skipped `ATOM` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the input.
    pub line_number: usize,
    /// Why the line was rejected.
    pub reason: String,
}

/// Bookkeeping of everything the parser dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseReport {
    /// `ATOM` lines seen in the first model.
    pub atom_lines: usize,
    /// Malformed `ATOM` lines.
    pub skipped: Vec<SkippedLine>,
    /// Repeated (chain, residue number, atom name) keys that were dropped.
    pub duplicates: usize,
    /// `ATOM` lines from models after the first.
    pub extra_model_atoms: usize,
    /// `HELIX`/`SHEET` lines that could not be used.
    pub segments_skipped: usize,
    /// Skip ratio above which the parse is flagged.
    pub skip_warning_ratio: f64,
}

impl ParseReport {
    /// Fraction of first-model `ATOM` lines that were malformed.
    #[must_use]
    pub fn skip_ratio(&self) -> f64 {
        if self.atom_lines == 0 {
            0.0
        } else {
            self.skipped.len() as f64 / self.atom_lines as f64
        }
    }

    /// Whether enough lines were skipped to warrant a visible warning.
    #[must_use]
    pub fn exceeds_skip_threshold(&self) -> bool {
        self.skip_ratio() > self.skip_warning_ratio
    }
}

/// Slice a fixed-width column, trimmed. Short lines and non-ASCII
/// boundaries yield an empty field instead of panicking.
fn column(line: &str, range: Range<usize>) -> &str {
    let end = range.end.min(line.len());
    if range.start >= end {
        return "";
    }
    line.get(range.start..end).map_or("", str::trim)
}

fn required<T: std::str::FromStr>(
    line: &str,
    range: Range<usize>,
    field: &str,
) -> Result<T, String> {
    let raw = column(line, range);
    raw.parse::<T>()
        .map_err(|_| format!("{field} column {raw:?} is not numeric"))
}

fn coordinate(
    line: &str,
    range: Range<usize>,
    field: &str,
) -> Result<f32, String> {
    let value: f32 = required(line, range, field)?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{field} coordinate is not finite"))
    }
}

fn optional_f32(line: &str, range: Range<usize>) -> Option<f32> {
    column(line, range)
        .parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
}

fn parse_atom(line: &str) -> Result<Atom, String> {
    let serial = required(line, SERIAL, "serial")?;
    let res_seq = required(line, RES_SEQ, "residue number")?;
    let x = coordinate(line, X, "x")?;
    let y = coordinate(line, Y, "y")?;
    let z = coordinate(line, Z, "z")?;

    Ok(Atom {
        serial,
        name: column(line, NAME).to_owned(),
        alt_loc: column(line, ALT_LOC).chars().next(),
        res_name: column(line, RES_NAME).to_owned(),
        chain_id: column(line, CHAIN).to_owned(),
        res_seq,
        insertion_code: column(line, I_CODE).chars().next(),
        position: Vec3::new(x, y, z),
        occupancy: optional_f32(line, OCCUPANCY),
        temp_factor: optional_f32(line, TEMP_FACTOR),
        element: column(line, ELEMENT).to_owned(),
        charge: column(line, CHARGE).to_owned(),
    })
}

fn parse_segment(
    line: &str,
    kind: SecondaryStructureKind,
    cols: &SegmentColumns,
) -> Option<SecondaryStructureSegment> {
    let start_res = column(line, cols.start_res.clone()).parse().ok()?;
    let end_res = column(line, cols.end_res.clone()).parse().ok()?;
    let segment = SecondaryStructureSegment {
        kind,
        start_chain: column(line, cols.start_chain.clone()).to_owned(),
        start_res,
        end_chain: column(line, cols.end_chain.clone()).to_owned(),
        end_res,
    };
    if !segment.is_cross_chain() && segment.start_res > segment.end_res {
        return None;
    }
    Some(segment)
}

/// Parse PDB-format text into atoms and secondary-structure segments.
///
/// Malformed `ATOM` rows are skipped and recorded in the report; only
/// the first model of a multi-model file contributes atoms, and repeated
/// (chain, residue, atom name) keys keep their first occurrence, whether
/// they repeat through alternate locations or insertion codes.
///
/// # Errors
///
/// Returns [`ParseError::NoAtoms`] if no `ATOM` record survives.
pub fn parse_pdb(
    text: &str,
    options: &ParseOptions,
) -> Result<Structure, ParseError> {
    let mut atoms = Vec::new();
    let mut segments = Vec::new();
    let mut report = ParseReport {
        skip_warning_ratio: options.skip_warning_ratio,
        ..ParseReport::default()
    };
    let mut seen: FxHashSet<(String, i32, String)> = FxHashSet::default();
    let mut first_model_done = false;

    for (idx, line) in text.lines().enumerate() {
        let line_number = idx + 1;
        if line.starts_with("ENDMDL") {
            first_model_done = true;
        } else if line.starts_with("ATOM") {
            if first_model_done {
                report.extra_model_atoms += 1;
                continue;
            }
            report.atom_lines += 1;
            match parse_atom(line) {
                Ok(atom) => {
                    let key =
                        (atom.chain_id.clone(), atom.res_seq, atom.name.clone());
                    if seen.insert(key) {
                        atoms.push(atom);
                    } else {
                        log::debug!(
                            "dropping repeated {} {} on line {line_number}",
                            atom.residue_label(),
                            atom.name
                        );
                        report.duplicates += 1;
                    }
                }
                Err(reason) => {
                    log::debug!("skipping ATOM line {line_number}: {reason}");
                    report.skipped.push(SkippedLine {
                        line_number,
                        reason,
                    });
                }
            }
        } else if line.starts_with("HELIX") || line.starts_with("SHEET") {
            let (kind, cols) = if line.starts_with("HELIX") {
                (SecondaryStructureKind::Helix, &HELIX_COLUMNS)
            } else {
                (SecondaryStructureKind::Sheet, &SHEET_COLUMNS)
            };
            match parse_segment(line, kind, cols) {
                Some(segment) => segments.push(segment),
                None => {
                    log::debug!(
                        "skipping {} line {line_number}",
                        kind.label()
                    );
                    report.segments_skipped += 1;
                }
            }
        }
    }

    if atoms.is_empty() {
        return Err(ParseError::NoAtoms {
            atom_lines: report.atom_lines,
        });
    }

    if report.exceeds_skip_threshold() {
        log::warn!(
            "skipped {} of {} ATOM lines ({:.1}%)",
            report.skipped.len(),
            report.atom_lines,
            report.skip_ratio() * 100.0
        );
    }
    if report.extra_model_atoms > 0 {
        log::info!(
            "ignored {} atoms from models after the first",
            report.extra_model_atoms
        );
    }

    Ok(Structure {
        atoms,
        segments,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::test_data::{
        atom_line, helix_line, sheet_line, two_chain_pdb,
    };

    fn parse(text: &str) -> Result<Structure, ParseError> {
        parse_pdb(text, &ParseOptions::default())
    }

    #[test]
    fn atom_count_matches_atom_lines() {
        let text = two_chain_pdb();
        let expected = text.lines().filter(|l| l.starts_with("ATOM")).count();
        let s = parse(&text).unwrap();
        assert_eq!(s.atoms.len(), expected);
        assert_eq!(s.report.atom_lines, expected);
        assert!(s.report.skipped.is_empty());
    }

    #[test]
    fn extracts_fixed_columns() {
        let line = "ATOM    145  CA  GLU A 484      12.345  -6.789  10.111  0.85 33.20           C  ";
        let s = parse(line).unwrap();
        let a = &s.atoms[0];
        assert_eq!(a.serial, 145);
        assert_eq!(a.name, "CA");
        assert_eq!(a.alt_loc, None);
        assert_eq!(a.res_name, "GLU");
        assert_eq!(a.chain_id, "A");
        assert_eq!(a.res_seq, 484);
        assert!((a.position - Vec3::new(12.345, -6.789, 10.111)).length() < 1e-4);
        assert_eq!(a.occupancy, Some(0.85));
        assert_eq!(a.temp_factor, Some(33.2));
        assert_eq!(a.element, "C");
        assert_eq!(a.charge, "");
        assert_eq!(a.insertion_code, None);
        assert_eq!(a.residue_label(), "GLU484");
    }

    #[test]
    fn insertion_code_is_parsed_and_labelled() {
        let mut gly = atom_line(1, "CA", "GLY", 'H', 52, [0.0; 3]);
        gly.replace_range(26..27, "A");
        let s = parse(&gly).unwrap();
        assert_eq!(s.atoms[0].insertion_code, Some('A'));
        assert_eq!(s.atoms[0].residue_label(), "GLY52A");
    }

    #[test]
    fn insertion_code_repeat_keeps_first() {
        let ser = atom_line(1, "CA", "SER", 'H', 52, [0.0; 3]);
        let mut gly = atom_line(2, "CA", "GLY", 'H', 52, [3.8, 0.0, 0.0]);
        gly.replace_range(26..27, "A");
        let s = parse(&format!("{ser}\n{gly}")).unwrap();
        assert_eq!(s.atoms.len(), 1);
        assert_eq!(s.atoms[0].residue_label(), "SER52");
        assert_eq!(s.report.duplicates, 1);
    }

    #[test]
    fn keys_are_unique() {
        let s = parse(&two_chain_pdb()).unwrap();
        let mut keys = FxHashSet::default();
        for a in &s.atoms {
            assert!(keys.insert((a.chain_id.clone(), a.res_seq, a.name.clone())));
        }
    }

    #[test]
    fn malformed_coordinates_are_skipped_and_counted() {
        let good = atom_line(1, "CA", "ALA", 'A', 1, [1.0, 2.0, 3.0]);
        let bad = "ATOM      2  CA  ALA A   2      xx.xxx   2.000   3.000  1.00 20.00           C  ";
        let text = format!("{good}\n{bad}");
        let s = parse(&text).unwrap();
        assert_eq!(s.atoms.len(), 1);
        assert_eq!(s.report.skipped.len(), 1);
        assert_eq!(s.report.skipped[0].line_number, 2);
        assert!(s.atoms.iter().all(|a| a.position.is_finite()));
        assert!(s.report.exceeds_skip_threshold());
    }

    #[test]
    fn skip_threshold_comes_from_options() {
        let good = atom_line(1, "CA", "ALA", 'A', 1, [1.0, 2.0, 3.0]);
        let text = format!("{good}\nATOM      2  CA  ALA A   2      xx.xxx");
        let lenient = ParseOptions {
            skip_warning_ratio: 0.6,
        };
        let s = parse_pdb(&text, &lenient).unwrap();
        assert_eq!(s.report.skip_warning_ratio, 0.6);
        assert_eq!(s.report.skip_ratio(), 0.5);
        assert!(!s.report.exceeds_skip_threshold());
    }

    #[test]
    fn short_lines_do_not_panic() {
        let text = "ATOM      1  CA  ALA A   1      1.0\nATOM";
        assert_eq!(
            parse(text).unwrap_err(),
            ParseError::NoAtoms { atom_lines: 2 }
        );
    }

    #[test]
    fn non_ascii_does_not_panic() {
        // The two-byte character shifts every later column by one byte.
        let text = "ATOM      1  CAÅ ALA A   1       1.000   2.000   3.000";
        assert_eq!(
            parse(text).unwrap_err(),
            ParseError::NoAtoms { atom_lines: 1 }
        );
    }

    #[test]
    fn empty_input_is_fatal() {
        assert_eq!(
            parse("").unwrap_err(),
            ParseError::NoAtoms { atom_lines: 0 }
        );
    }

    #[test]
    fn optional_fields_may_be_blank() {
        let line = "ATOM      1  CA  ALA A   1       1.000   2.000   3.000";
        let s = parse(line).unwrap();
        assert_eq!(s.atoms[0].occupancy, None);
        assert_eq!(s.atoms[0].temp_factor, None);
        assert_eq!(s.atoms[0].element, "");
    }

    #[test]
    fn parses_helix_and_sheet_columns() {
        let text = [
            helix_line('A', 3, 12),
            sheet_line('B', 20, 25),
            atom_line(1, "CA", "ALA", 'A', 3, [0.0; 3]),
        ]
        .join("\n");
        let s = parse(&text).unwrap();
        assert_eq!(s.segments.len(), 2);
        let helix = &s.segments[0];
        assert_eq!(helix.kind, SecondaryStructureKind::Helix);
        assert_eq!((helix.start_chain.as_str(), helix.start_res), ("A", 3));
        assert_eq!((helix.end_chain.as_str(), helix.end_res), ("A", 12));
        let sheet = &s.segments[1];
        assert_eq!(sheet.kind, SecondaryStructureKind::Sheet);
        assert_eq!((sheet.start_chain.as_str(), sheet.start_res), ("B", 20));
        assert_eq!((sheet.end_chain.as_str(), sheet.end_res), ("B", 25));
    }

    #[test]
    fn reversed_segment_is_skipped() {
        let text = [
            helix_line('A', 12, 3),
            atom_line(1, "CA", "ALA", 'A', 3, [0.0; 3]),
        ]
        .join("\n");
        let s = parse(&text).unwrap();
        assert!(s.segments.is_empty());
        assert_eq!(s.report.segments_skipped, 1);
    }

    #[test]
    fn only_first_model_is_used() {
        let text = [
            "MODEL        1".to_owned(),
            atom_line(1, "CA", "ALA", 'A', 1, [0.0; 3]),
            "ENDMDL".to_owned(),
            "MODEL        2".to_owned(),
            atom_line(1, "CA", "ALA", 'A', 1, [5.0; 3]),
            "ENDMDL".to_owned(),
        ]
        .join("\n");
        let s = parse(&text).unwrap();
        assert_eq!(s.atoms.len(), 1);
        assert_eq!(s.report.extra_model_atoms, 1);
        assert_eq!(s.atoms[0].position, Vec3::ZERO);
    }

    #[test]
    fn alternate_locations_keep_first() {
        let mut a = atom_line(1, "CA", "SER", 'A', 5, [1.0; 3]);
        let mut b = atom_line(2, "CA", "SER", 'A', 5, [2.0; 3]);
        a.replace_range(16..17, "A");
        b.replace_range(16..17, "B");
        let s = parse(&format!("{a}\n{b}")).unwrap();
        assert_eq!(s.atoms.len(), 1);
        assert_eq!(s.atoms[0].alt_loc, Some('A'));
        assert_eq!(s.report.duplicates, 1);
    }

    #[test]
    fn hetatm_records_are_ignored() {
        let text = [
            atom_line(1, "CA", "ALA", 'A', 1, [0.0; 3]),
            "HETATM    2  O   HOH A 101       1.000   1.000   1.000  1.00 10.00           O  "
                .to_owned(),
        ]
        .join("\n");
        assert_eq!(parse(&text).unwrap().atoms.len(), 1);
    }
}
