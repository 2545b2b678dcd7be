pub mod conditions;
pub mod extract;
pub mod fallback;
pub mod huggingface;
pub mod language_detect;
pub mod mistral;
pub mod orchestrator;
pub mod parser;
pub mod prompt;
pub mod sections;
pub mod translate;
pub mod types;

pub use conditions::*;
pub use extract::*;
pub use fallback::*;
pub use huggingface::*;
pub use language_detect::*;
pub use mistral::*;
pub use orchestrator::*;
pub use parser::*;
pub use prompt::*;
pub use sections::*;
pub use translate::*;
pub use types::*;

use thiserror::Error;

/// Failure of a single completion provider call.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("{0} provider is not configured (missing API key)")]
    NotConfigured(&'static str),

    #[error("Cannot reach {0}")]
    Connection(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Provider returned error (status {status}): {body}")]
    Http { status: u16, body: String },

    #[error("Provider reported an error: {0}")]
    Api(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Provider returned an empty completion")]
    EmptyCompletion,
}

/// Terminal failure of an analysis request.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Analysis failed, please retry (primary: {primary}; fallback: {fallback})")]
    ProvidersExhausted {
        primary: ProviderError,
        fallback: ProviderError,
    },

    #[error("Analysis was cancelled")]
    Cancelled,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TranslationError {
    #[error("Translation service unreachable: {0}")]
    Connection(String),

    #[error("Translation service returned status {0}")]
    Http(u16),

    #[error("Translation response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Translation service rejected the request: {0}")]
    Rejected(String),
}
