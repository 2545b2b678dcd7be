use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::prompt::AnalysisPrompt;
use super::ProviderError;

/// Hosted text-completion endpoint (allows mocking).
///
/// Implementations differ only in request/response envelope; every one
/// returns the raw generated text or a typed failure.
pub trait CompletionProvider {
    /// Short stable name used in logs and health reports.
    fn name(&self) -> &'static str;

    fn complete(&self, prompt: &AnalysisPrompt) -> Result<String, ProviderError>;
}

/// Mock provider for testing. Returns a fixed outcome and counts calls.
pub struct MockCompletionProvider {
    name: &'static str,
    outcome: Result<String, ProviderError>,
    calls: Arc<AtomicUsize>,
}

impl MockCompletionProvider {
    pub fn succeeding(name: &'static str, completion: &str) -> Self {
        Self {
            name,
            outcome: Ok(completion.to_string()),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(name: &'static str, error: ProviderError) -> Self {
        Self {
            name,
            outcome: Err(error),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shared call counter, still readable after the mock is boxed.
    pub fn call_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.calls)
    }
}

impl CompletionProvider for MockCompletionProvider {
    fn name(&self) -> &'static str {
        self.name
    }

    fn complete(&self, _prompt: &AnalysisPrompt) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}
