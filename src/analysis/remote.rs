use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use super::{
    prompts, AnalysisError, AnalysisProvider, AnalysisRequest, ProviderOutput,
};
use crate::options::AnalysisOptions;

/// OpenAI-compatible chat-completions backend.
pub struct RemoteProvider {
    endpoint: String,
    model: String,
    api_key: String,
    agent: ureq::Agent,
}

impl std::fmt::Debug for RemoteProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteProvider")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

#[derive(Deserialize)]
struct Completion {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    content: Option<String>,
}

impl RemoteProvider {
    /// Provider for `options.endpoint`, authenticating with `api_key`.
    #[must_use]
    pub fn new(options: &AnalysisOptions, api_key: String) -> Self {
        let agent: ureq::Agent = ureq::Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(options.timeout_secs)))
            .build()
            .into();
        Self {
            endpoint: options.endpoint.clone(),
            model: options.model.clone(),
            api_key,
            agent,
        }
    }

    fn request_body(&self, request: &AnalysisRequest<'_>) -> Value {
        let (system, user, temperature) = prompts::build(request);
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": user },
            ],
            "response_format": { "type": "json_object" },
            "temperature": temperature,
        })
    }
}

impl AnalysisProvider for RemoteProvider {
    fn name(&self) -> &str {
        "remote"
    }

    fn analyze(
        &self,
        request: &AnalysisRequest<'_>,
    ) -> Result<ProviderOutput, AnalysisError> {
        let body = self.request_body(request);
        log::debug!("POST {} ({})", self.endpoint, request.kind());

        let mut response = self
            .agent
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send_json(&body)
            .map_err(|e| match e {
                ureq::Error::StatusCode(code) => AnalysisError::Status(code),
                other => AnalysisError::Transport(other.to_string()),
            })?;
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        let results = completion_json(&text)?;
        Ok(ProviderOutput {
            results,
            confidence: confidence_for(request),
        })
    }
}

/// Confidence attached to remote results of each kind.
fn confidence_for(request: &AnalysisRequest<'_>) -> Option<f64> {
    match request {
        AnalysisRequest::Structure { .. } => Some(0.92),
        AnalysisRequest::BindingSites { .. } => Some(0.88),
        AnalysisRequest::DrugCandidates { .. } => None,
    }
}

/// Extract and parse the JSON object the model answered with.
fn completion_json(body: &str) -> Result<Value, AnalysisError> {
    let completion: Completion = serde_json::from_str(body)
        .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))?;
    let content = completion
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| {
            AnalysisError::MalformedResponse("no content returned".to_owned())
        })?;
    serde_json::from_str(&content)
        .map_err(|e| AnalysisError::MalformedResponse(e.to_string()))
}
