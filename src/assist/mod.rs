//! Boundary to an external text-generation service.
//!
//! A [`TextGenerator`] turns a prompt into free text that should contain a
//! JSON object `{"sysml": "...", "notes": ["..."]}`. [`generate_source`]
//! pulls that object out of the reply and falls back to a local heuristic
//! when the service fails or returns nothing usable, so callers always get
//! some source text to feed through the parser.

mod extract;
mod fallback;

pub use extract::{Generation, extract_generation};
pub use fallback::fallback_source;

use crate::parser::parse;
use thiserror::Error;

/// Instructions sent with every request unless the caller overrides them.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You write SysML v2 textual notation. \
Reply with a single JSON object {\"sysml\": string, \"notes\": string[]} and nothing else.";

/// Failures reported by a [`TextGenerator`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssistError {
    #[error("generator unavailable: {0}")]
    Unavailable(String),
    #[error("request rejected: {0}")]
    Rejected(String),
    #[error("generator failed: {0}")]
    Failed(String),
}

/// Binary input passed along with a prompt, such as a sketch or screenshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub media_type: String,
    /// Base64-encoded content.
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub attachments: Vec<Attachment>,
}

impl GenerationRequest {
    pub fn new(user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            user_prompt: user_prompt.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// A service that completes prompts.
///
/// Calls block until the service answers; timeouts and retries belong to
/// the implementation.
pub trait TextGenerator {
    fn generate(&self, request: &GenerationRequest) -> Result<String, AssistError>;
}

impl<F> TextGenerator for F
where
    F: Fn(&GenerationRequest) -> Result<String, AssistError>,
{
    fn generate(&self, request: &GenerationRequest) -> Result<String, AssistError> {
        self(request)
    }
}

/// Result of [`generate_source`]. `sysml` is never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationOutcome {
    pub sysml: String,
    pub notes: Vec<String>,
    pub used_fallback: bool,
}

/// Ask `generator` for source text, falling back to [`fallback_source`].
pub fn generate_source(
    generator: &dyn TextGenerator,
    request: &GenerationRequest,
) -> GenerationOutcome {
    let reply = match generator.generate(request) {
        Ok(reply) => reply,
        Err(error) => {
            tracing::warn!(%error, "text generation failed, using local fallback");
            return fallback(request, format!("Generator failed: {error}"));
        }
    };

    let Some(generation) = extract_generation(&reply) else {
        tracing::warn!(len = reply.len(), "no usable sysml in generator reply");
        return fallback(request, "Generator reply had no usable sysml".to_string());
    };

    let mut notes = generation.notes;
    let errors = parse(&generation.sysml).errors.len();
    if errors > 0 {
        notes.push(format!("Generated source has {errors} parse error(s)"));
    }
    tracing::debug!(len = generation.sysml.len(), errors, "generated source");
    GenerationOutcome {
        sysml: generation.sysml,
        notes,
        used_fallback: false,
    }
}

fn fallback(request: &GenerationRequest, reason: String) -> GenerationOutcome {
    GenerationOutcome {
        sysml: fallback_source(&request.user_prompt),
        notes: vec![reason],
        used_fallback: true,
    }
}
