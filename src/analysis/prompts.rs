//! Chat prompts for the remote provider.

use std::fmt::Write as _;

use super::AnalysisRequest;

/// Characters of PDB text included in a structure prompt.
const STRUCTURE_EXCERPT_CHARS: usize = 500;

/// System message, user message and sampling temperature for `request`.
pub(crate) fn build(request: &AnalysisRequest<'_>) -> (&'static str, String, f64) {
    match request {
        AnalysisRequest::Structure { id, text } => (
            "You are a protein structure analysis expert. Provide detailed \
             scientific analysis in JSON format.",
            format!(
                "Analyze this protein structure with PDB ID {id}:\n\n\
                 {}... (structure data truncated)\n\n\
                 Provide a detailed analysis of:\n\
                 1. Secondary structure composition and patterns\n\
                 2. Key functional domains and their potential roles\n\
                 3. Stability assessment based on structural features\n\
                 4. Potential binding sites and their characteristics\n\n\
                 Format your response as JSON with these keys:\n\
                 secondary_structure, functional_domains, stability_assessment, binding_sites",
                excerpt(text, STRUCTURE_EXCERPT_CHARS)
            ),
            0.2,
        ),
        AnalysisRequest::BindingSites { id, sites } => {
            let mut listing = String::new();
            for site in *sites {
                let _ = writeln!(
                    listing,
                    "- {}: key residues {}",
                    site.name,
                    or_unknown(&site.key_residues)
                );
            }
            (
                "You are a computational drug discovery expert. Analyze binding \
                 sites and provide druggability assessments in JSON format.",
                format!(
                    "Analyze these binding sites of protein {id}:\n\n{listing}\n\
                     Provide a detailed druggability analysis:\n\
                     1. Key residues for binding and their properties\n\
                     2. Pocket shape characteristics\n\
                     3. Electrostatic and hydrophobic properties\n\
                     4. Druggability score and rationale\n\
                     5. Suggested pharmacophore features for drug design\n\n\
                     Format your response as JSON with these keys:\n\
                     key_residues, pocket_properties, electrostatics, \
                     druggability_score, pharmacophore_features"
                ),
                0.2,
            )
        }
        AnalysisRequest::DrugCandidates { id, site } => (
            "You are an expert in medicinal chemistry and drug design.",
            format!(
                "Target protein PDB ID: {id}\n\
                 Binding site: {}\n\
                 Description: {}\n\
                 Key residues: {}\n\
                 Druggability score: {}\n\n\
                 Generate 3 unique molecule candidates that could bind to this site. \
                 For each give name, smiles, properties (molecularWeight, logP, \
                 hBondDonors, hBondAcceptors, rotatableBonds, polarSurfaceArea), \
                 bindingAffinity (0-10) and drugLikeness (0-1).\n\n\
                 Format your response as a JSON object with a \"molecules\" array.",
                site.name,
                site.description.as_deref().unwrap_or("Not available"),
                or_unknown(&site.key_residues),
                site.druggability_score.unwrap_or(0.0),
            ),
            0.7,
        ),
    }
}

fn or_unknown(s: &str) -> &str {
    if s.trim().is_empty() {
        "Not available"
    } else {
        s
    }
}

/// First `max_chars` characters of `text`.
fn excerpt(text: &str, max_chars: usize) -> &str {
    text.char_indices()
        .nth(max_chars)
        .map_or(text, |(end, _)| &text[..end])
}
