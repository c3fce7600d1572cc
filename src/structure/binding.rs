use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BindviewError;

/// A named binding site, supplied by the surrounding application.
///
/// Membership is decided by plain substring matching on
/// [`key_residues`](Self::key_residues), so `"GLU484, K417"` flags
/// `GLU484` but not `LYS417`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct BindingSite {
    /// Display name, e.g. "Receptor binding motif".
    pub name: String,
    /// Comma-separated residue tokens (`GLU484, K417`).
    #[serde(default)]
    pub key_residues: String,
    /// Free-text description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Prediction confidence in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// Druggability score in `[0, 1]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub druggability_score: Option<f64>,
}

impl BindingSite {
    /// Create a site from a name and key-residue text.
    #[must_use]
    pub fn new(name: &str, key_residues: &str) -> Self {
        Self {
            name: name.to_owned(),
            key_residues: key_residues.to_owned(),
            ..Self::default()
        }
    }

    /// Whether the key-residue text contains `label` verbatim.
    #[must_use]
    pub fn mentions(&self, label: &str) -> bool {
        !label.is_empty() && self.key_residues.contains(label)
    }

    /// Individual residue tokens, trimmed, empties dropped.
    pub fn residue_tokens(&self) -> impl Iterator<Item = &str> {
        self.key_residues
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// Whether any of `sites` mentions `label`.
    #[must_use]
    pub fn any_mentions(sites: &[Self], label: &str) -> bool {
        sites.iter().any(|s| s.mentions(label))
    }
}

/// Read a JSON array of binding sites.
///
/// # Errors
///
/// Returns [`BindviewError::Io`] or [`BindviewError::Json`].
pub fn load_binding_sites(path: &Path) -> Result<Vec<BindingSite>, BindviewError> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literal_substring_membership() {
        let sites = [BindingSite::new("RBM", "K417, F486, Y489, Q493, Q498")];
        assert!(!BindingSite::any_mentions(&sites, "GLU484"));

        let sites = [BindingSite::new("RBM", "GLU484, K417")];
        assert!(BindingSite::any_mentions(&sites, "GLU484"));
        assert!(!BindingSite::any_mentions(&sites, "LYS417"));
    }

    #[test]
    fn empty_sites_flag_nothing() {
        assert!(!BindingSite::any_mentions(&[], "GLU484"));
        assert!(!BindingSite::new("x", "").mentions(""));
    }

    #[test]
    fn tokens_are_trimmed() {
        let site = BindingSite::new("s", " TRP84,SER203 , ,HIS447");
        let tokens: Vec<&str> = site.residue_tokens().collect();
        assert_eq!(tokens, vec!["TRP84", "SER203", "HIS447"]);
    }

    #[test]
    fn deserializes_camel_case() {
        let json = r#"[{"name": "Pocket 1", "keyResidues": "TRP84, SER203",
                       "druggabilityScore": 0.85}]"#;
        let sites: Vec<BindingSite> = serde_json::from_str(json).unwrap();
        assert_eq!(sites[0].name, "Pocket 1");
        assert_eq!(sites[0].key_residues, "TRP84, SER203");
        assert_eq!(sites[0].druggability_score, Some(0.85));
        assert_eq!(sites[0].confidence, None);
    }

    #[test]
    fn missing_key_residues_defaults_to_empty() {
        let sites: Vec<BindingSite> =
            serde_json::from_str(r#"[{"name": "bare"}]"#).unwrap();
        assert!(sites[0].key_residues.is_empty());
    }
}
