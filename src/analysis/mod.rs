//! Structure and binding-site analysis providers.
//!
//! A provider turns an [`AnalysisRequest`] into JSON results. Which one
//! runs is decided once, from [`AnalysisOptions::provider`]; a remote
//! provider without credentials is rejected at construction rather than
//! silently replaced. [`run`] wraps the call into an [`Analysis`] record,
//! turning provider failures into a `failed` record instead of an error.

mod fixture;
#[cfg(feature = "fetch")]
mod prompts;
#[cfg(feature = "fetch")]
mod remote;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

pub use self::fixture::FixtureProvider;
#[cfg(feature = "fetch")]
pub use self::remote::RemoteProvider;
use crate::options::{AnalysisOptions, ProviderKind};
use crate::structure::{BindingSite, StructureId};

/// What to analyze.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    /// Secondary structure, domains, stability and likely binding sites.
    StructurePrediction,
    /// Druggability of the supplied binding sites.
    BindingSiteAnalysis,
    /// Candidate molecules for one binding site.
    DrugCandidates,
}

impl AnalysisKind {
    /// Wire name, as serialized.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::StructurePrediction => "structure_prediction",
            Self::BindingSiteAnalysis => "binding_site_analysis",
            Self::DrugCandidates => "drug_candidates",
        }
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnalysisKind {
    type Err = AnalysisError;

    /// Accepts the wire names and the short forms `structure`, `sites`
    /// and `candidates`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "structure" | "structure_prediction" => Ok(Self::StructurePrediction),
            "sites" | "binding_sites" | "binding_site_analysis" => {
                Ok(Self::BindingSiteAnalysis)
            }
            "candidates" | "drug_candidates" => Ok(Self::DrugCandidates),
            _ => Err(AnalysisError::UnknownKind(s.to_owned())),
        }
    }
}

/// Outcome flag of an [`Analysis`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisStatus {
    /// Results hold the provider's answer.
    Completed,
    /// Results hold `{error, message}`.
    Failed,
}

/// One analysis result, completed or failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Analysis {
    /// What was analyzed.
    #[serde(rename = "type")]
    pub kind: AnalysisKind,
    /// Completed or failed.
    pub status: AnalysisStatus,
    /// Provider confidence; absent on failure.
    pub confidence: Option<f64>,
    /// Provider JSON, or `{error, message}` on failure.
    pub results: Value,
    /// Name of the provider that produced it.
    pub provider: String,
    /// Seconds since the Unix epoch.
    pub created_at: u64,
}

impl Analysis {
    /// Whether the provider call succeeded.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == AnalysisStatus::Completed
    }
}

/// Input to a provider.
#[derive(Debug, Clone, Copy)]
pub enum AnalysisRequest<'a> {
    /// Analyze a structure from its PDB text.
    Structure {
        /// Structure identifier.
        id: &'a StructureId,
        /// Raw PDB text; providers may truncate it.
        text: &'a str,
    },
    /// Assess the druggability of binding sites.
    BindingSites {
        /// Structure the sites belong to.
        id: &'a StructureId,
        /// Sites to assess.
        sites: &'a [BindingSite],
    },
    /// Propose molecules for one site.
    DrugCandidates {
        /// Structure the site belongs to.
        id: &'a StructureId,
        /// Target site.
        site: &'a BindingSite,
    },
}

impl AnalysisRequest<'_> {
    /// Kind of analysis this request asks for.
    #[must_use]
    pub fn kind(&self) -> AnalysisKind {
        match self {
            Self::Structure { .. } => AnalysisKind::StructurePrediction,
            Self::BindingSites { .. } => AnalysisKind::BindingSiteAnalysis,
            Self::DrugCandidates { .. } => AnalysisKind::DrugCandidates,
        }
    }
}

/// A proposed molecule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugCandidate {
    /// Display name.
    pub name: String,
    /// SMILES string.
    pub smiles: String,
    /// Estimated physico-chemical properties.
    pub properties: MoleculeProperties,
    /// Binding affinity estimate on a 0-10 scale.
    #[serde(default)]
    pub binding_affinity: f64,
    /// Drug-likeness score in `[0, 1]`.
    #[serde(default)]
    pub drug_likeness: f64,
}

/// Properties of a [`DrugCandidate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct MoleculeProperties {
    /// Daltons.
    pub molecular_weight: f64,
    /// Octanol-water partition coefficient.
    pub log_p: f64,
    /// Hydrogen-bond donors.
    pub h_bond_donors: u32,
    /// Hydrogen-bond acceptors.
    pub h_bond_acceptors: u32,
    /// Rotatable bonds.
    #[serde(alias = "rotableBonds")]
    pub rotatable_bonds: u32,
    /// Square angstroms.
    pub polar_surface_area: f64,
}

/// What a provider returns on success.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderOutput {
    /// Result JSON.
    pub results: Value,
    /// Confidence attached to the results, if the provider states one.
    pub confidence: Option<f64>,
}

/// Analysis failures.
#[derive(Debug)]
pub enum AnalysisError {
    /// The remote provider was selected but its key is not set.
    MissingApiKey {
        /// Environment variable that was read.
        env: String,
    },
    /// The remote provider is not compiled in.
    RemoteUnavailable,
    /// Unrecognized analysis kind name.
    UnknownKind(String),
    /// Drug-candidate generation was asked for without a binding site.
    MissingBindingSite,
    /// Request could not be sent or the response not read.
    Transport(String),
    /// Endpoint answered with a non-success status.
    Status(u16),
    /// Response did not contain the expected JSON.
    MalformedResponse(String),
}

impl fmt::Display for AnalysisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingApiKey { env } => {
                write!(f, "remote analysis selected but {env} is not set")
            }
            Self::RemoteUnavailable => {
                f.write_str("remote analysis requires the `fetch` feature")
            }
            Self::UnknownKind(kind) => write!(f, "unknown analysis kind {kind:?}"),
            Self::MissingBindingSite => {
                f.write_str("drug candidates need a binding site")
            }
            Self::Transport(msg) => write!(f, "analysis request failed: {msg}"),
            Self::Status(code) => {
                write!(f, "analysis endpoint answered with status {code}")
            }
            Self::MalformedResponse(msg) => {
                write!(f, "malformed analysis response: {msg}")
            }
        }
    }
}

impl std::error::Error for AnalysisError {}

/// An analysis backend.
pub trait AnalysisProvider: Send + Sync {
    /// Short name recorded on every [`Analysis`].
    fn name(&self) -> &str;

    /// Produce results for `request`.
    ///
    /// # Errors
    ///
    /// Any [`AnalysisError`] from talking to the backend.
    fn analyze(
        &self,
        request: &AnalysisRequest<'_>,
    ) -> Result<ProviderOutput, AnalysisError>;
}

/// Build the provider selected in `options`.
///
/// # Errors
///
/// [`AnalysisError::MissingApiKey`] when the remote provider is selected
/// and its key variable is unset or empty, and
/// [`AnalysisError::RemoteUnavailable`] when it is selected in a build
/// without HTTP support.
pub fn provider_from_options(
    options: &AnalysisOptions,
) -> Result<Box<dyn AnalysisProvider>, AnalysisError> {
    let key = std::env::var(&options.api_key_env).ok();
    build_provider(options, key)
}

fn build_provider(
    options: &AnalysisOptions,
    api_key: Option<String>,
) -> Result<Box<dyn AnalysisProvider>, AnalysisError> {
    match options.provider {
        ProviderKind::Fixture => Ok(Box::new(FixtureProvider)),
        ProviderKind::Remote => {
            let key = api_key.filter(|k| !k.trim().is_empty()).ok_or_else(|| {
                AnalysisError::MissingApiKey {
                    env: options.api_key_env.clone(),
                }
            })?;
            remote_provider(options, key)
        }
    }
}

#[cfg(feature = "fetch")]
fn remote_provider(
    options: &AnalysisOptions,
    key: String,
) -> Result<Box<dyn AnalysisProvider>, AnalysisError> {
    Ok(Box::new(RemoteProvider::new(options, key)))
}

#[cfg(not(feature = "fetch"))]
fn remote_provider(
    _options: &AnalysisOptions,
    _key: String,
) -> Result<Box<dyn AnalysisProvider>, AnalysisError> {
    Err(AnalysisError::RemoteUnavailable)
}

/// Run `request` through `provider`, recording failures as a `failed`
/// analysis.
pub fn run(provider: &dyn AnalysisProvider, request: &AnalysisRequest<'_>) -> Analysis {
    let kind = request.kind();
    log::info!("running {kind} with {}", provider.name());

    let (status, confidence, results) = match provider.analyze(request) {
        Ok(output) => (AnalysisStatus::Completed, output.confidence, output.results),
        Err(e) => {
            log::error!("{kind} with {} failed: {e}", provider.name());
            let error = match kind {
                AnalysisKind::DrugCandidates => "Failed to generate drug candidates",
                _ => "Analysis failed",
            };
            (
                AnalysisStatus::Failed,
                None,
                json!({ "error": error, "message": e.to_string() }),
            )
        }
    };

    Analysis {
        kind,
        status,
        confidence,
        results,
        provider: provider.name().to_owned(),
        created_at: unix_now(),
    }
}

fn unix_now() -> u64 {
    web_time::SystemTime::now()
        .duration_since(web_time::SystemTime::UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
