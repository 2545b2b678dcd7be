use std::sync::LazyLock;

use regex::Regex;

use super::types::{InputModification, InputModificationKind, SafetyError, SanitizedInput};

/// Maximum symptom description length in characters.
pub const MAX_SYMPTOMS_LENGTH: usize = 2_000;

/// Sanitize a symptom description before it is embedded in a prompt.
pub fn sanitize_symptoms_with_limit(
    raw: &str,
    max_length: usize,
) -> Result<SanitizedInput, SafetyError> {
    let mut text = raw.to_string();
    let mut modifications = Vec::new();

    // Step 1: Remove non-visible Unicode characters
    let before = text.clone();
    text = remove_invisible_unicode(&text);
    if text != before {
        modifications.push(InputModification {
            kind: InputModificationKind::InvisibleUnicodeRemoved,
            description: "Stripped non-visible Unicode characters".to_string(),
        });
    }

    // Step 2: Remove control characters (except newline, tab)
    let before = text.clone();
    text = remove_control_characters(&text);
    if text != before {
        modifications.push(InputModification {
            kind: InputModificationKind::ControlCharacterRemoved,
            description: "Stripped control characters".to_string(),
        });
    }

    // Step 3: Neutralize prompt-control tokens and injection phrases
    let before = text.clone();
    text = remove_injection_patterns(&text);
    if text != before {
        modifications.push(InputModification {
            kind: InputModificationKind::InjectionPatternRemoved,
            description: "Removed potential prompt injection patterns".to_string(),
        });
    }

    let trimmed = text.trim();
    if trimmed.len() != text.len() {
        text = trimmed.to_string();
    }

    // Step 4: Truncate to maximum length
    let char_count = text.chars().count();
    if char_count > max_length {
        text = truncate_at_word_boundary(&text, max_length);
        modifications.push(InputModification {
            kind: InputModificationKind::ExcessiveLengthTruncated,
            description: format!(
                "Truncated from {} to {} characters",
                char_count,
                text.chars().count()
            ),
        });
    }

    if text.replace("[FILTERED]", "").trim().is_empty() {
        return Err(SafetyError::EmptyInput);
    }

    let was_modified = !modifications.is_empty();
    if was_modified {
        tracing::debug!(
            modifications = ?modifications.iter().map(|m| m.kind.as_str()).collect::<Vec<_>>(),
            "Symptom input sanitized"
        );
    }

    Ok(SanitizedInput {
        text,
        was_modified,
        modifications,
    })
}

/// Sanitize with the standard maximum length.
pub fn sanitize_symptoms(raw: &str) -> Result<SanitizedInput, SafetyError> {
    sanitize_symptoms_with_limit(raw, MAX_SYMPTOMS_LENGTH)
}

/// Remove zero-width and invisible Unicode characters.
///
/// ZWJ/ZWNJ (U+200C, U+200D) are kept: Tamil spelling relies on them.
fn remove_invisible_unicode(text: &str) -> String {
    text.chars()
        .filter(|c| {
            !matches!(
                *c,
                '\u{200B}'                // Zero-width space
                | '\u{200E}'..='\u{200F}' // Directional marks
                | '\u{202A}'..='\u{202E}' // Directional formatting
                | '\u{2060}'..='\u{2064}' // Invisible operators
                | '\u{2066}'..='\u{2069}' // Directional isolates
                | '\u{FEFF}'              // BOM
                | '\u{00AD}'              // Soft hyphen
                | '\u{034F}'              // Combining grapheme joiner
                | '\u{180E}'              // Mongolian vowel separator
            )
        })
        .collect()
}

/// Remove control characters except newline and tab.
fn remove_control_characters(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect()
}

/// Remove known prompt injection patterns, replacing with [FILTERED].
fn remove_injection_patterns(text: &str) -> String {
    static INJECTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
        vec![
            // Role override attempts
            Regex::new(r"(?i)ignore\s+(?:previous|above|all\s+prior|the\s+above)\s+(?:instructions?|rules?|prompts?)").unwrap(),
            Regex::new(r"(?i)forget\s+(?:everything|all|your)\s+(?:previous|prior)?").unwrap(),
            Regex::new(r"(?i)new\s+instructions?:").unwrap(),
            Regex::new(r"(?i)you\s+are\s+now\s+(?:a|an)\s+").unwrap(),
            // Role prefixes
            Regex::new(r"(?im)^\s*(?:system|assistant|user)\s*:").unwrap(),
            // Instruction-format control tokens
            Regex::new(r"(?i)\[/?INST\]").unwrap(),
            Regex::new(r"</?s>").unwrap(),
            Regex::new(r"<<?/?SYS>>?").unwrap(),
            Regex::new(r"<\|im_(?:start|end)\|>").unwrap(),
        ]
    });

    let mut result = text.to_string();
    for pattern in INJECTION_PATTERNS.iter() {
        result = pattern.replace_all(&result, "[FILTERED]").to_string();
    }
    result
}

/// Truncate to at most `max_chars` characters, preferring a word boundary.
fn truncate_at_word_boundary(text: &str, max_chars: usize) -> String {
    let byte_limit = match text.char_indices().nth(max_chars) {
        Some((idx, _)) => idx,
        None => return text.to_string(),
    };
    let truncated = &text[..byte_limit];
    match truncated.rfind(char::is_whitespace) {
        Some(pos) if pos > 0 => truncated[..pos].to_string(),
        _ => truncated.to_string(),
    }
}
