use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BindviewError;

/// A validated 4-character structure identifier (e.g. `6VXX`), stored
/// upper case.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct StructureId(String);

impl StructureId {
    /// Validate and normalize an identifier.
    ///
    /// # Errors
    ///
    /// Returns [`BindviewError::InvalidStructureId`] unless the input is
    /// exactly four ASCII alphanumerics (surrounding whitespace ignored).
    pub fn new(raw: &str) -> Result<Self, BindviewError> {
        let trimmed = raw.trim();
        if trimmed.len() == 4
            && trimmed.chars().all(|c| c.is_ascii_alphanumeric())
        {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(BindviewError::InvalidStructureId(raw.to_owned()))
        }
    }

    /// Upper-case identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Substitute this id into a URL or path template containing `{id}`
    /// (upper case) or `{id_lower}`.
    #[must_use]
    pub fn fill(&self, template: &str) -> String {
        template
            .replace("{id_lower}", &self.0.to_ascii_lowercase())
            .replace("{id}", &self.0)
    }
}

impl fmt::Display for StructureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for StructureId {
    type Err = BindviewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for StructureId {
    type Error = BindviewError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<StructureId> for String {
    fn from(id: StructureId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_to_upper_case() {
        let id = StructureId::new(" 6vxx ").unwrap();
        assert_eq!(id.as_str(), "6VXX");
        assert_eq!(id.to_string(), "6VXX");
    }

    #[test]
    fn rejects_wrong_length_and_symbols() {
        assert!(StructureId::new("6VX").is_err());
        assert!(StructureId::new("6VXXX").is_err());
        assert!(StructureId::new("6V-X").is_err());
        assert!("".parse::<StructureId>().is_err());
    }

    #[test]
    fn fills_url_templates() {
        let id = StructureId::new("1abc").unwrap();
        assert_eq!(
            id.fill("https://files.rcsb.org/download/{id}.pdb"),
            "https://files.rcsb.org/download/1ABC.pdb"
        );
        assert_eq!(id.fill("cache/{id_lower}.pdb"), "cache/1abc.pdb");
    }

    #[test]
    fn serde_validates() {
        let ok: StructureId = serde_json::from_str("\"2xyz\"").unwrap();
        assert_eq!(ok.as_str(), "2XYZ");
        assert!(serde_json::from_str::<StructureId>("\"toolong\"").is_err());
    }
}
