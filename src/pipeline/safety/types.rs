use thiserror::Error;

/// Result of input sanitization (pre-LLM).
#[derive(Debug, Clone)]
pub struct SanitizedInput {
    /// The cleaned symptom text.
    pub text: String,
    /// Whether any modifications were made.
    pub was_modified: bool,
    /// What was stripped (for logs, no symptom text).
    pub modifications: Vec<InputModification>,
}

/// A modification made during input sanitization.
#[derive(Debug, Clone)]
pub struct InputModification {
    pub kind: InputModificationKind,
    pub description: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputModificationKind {
    InvisibleUnicodeRemoved,
    ControlCharacterRemoved,
    InjectionPatternRemoved,
    ExcessiveLengthTruncated,
}

impl InputModificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvisibleUnicodeRemoved => "invisible_unicode_removed",
            Self::ControlCharacterRemoved => "control_character_removed",
            Self::InjectionPatternRemoved => "injection_pattern_removed",
            Self::ExcessiveLengthTruncated => "excessive_length_truncated",
        }
    }
}

/// Request rejected before the pipeline runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SafetyError {
    #[error("Please describe your symptoms")]
    EmptyInput,

    #[error("Unsupported image type: {0} (only JPEG and PNG are accepted)")]
    UnsupportedImageType(String),

    #[error("Image is too large ({size} bytes, maximum {max} bytes)")]
    ImageTooLarge { size: u64, max: u64 },

    #[error("Image analysis requires an uploaded image")]
    MissingImageReference,
}
