use super::types::SafetyError;
use crate::models::InputKind;

/// Largest accepted image upload (5 MiB).
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

const ACCEPTED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/jpg", "image/png"];

/// Check an uploaded image's declared type and size.
pub fn validate_image_upload(content_type: &str, size_bytes: u64) -> Result<(), SafetyError> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if !ACCEPTED_IMAGE_TYPES.contains(&mime.as_str()) {
        return Err(SafetyError::UnsupportedImageType(content_type.to_string()));
    }
    if size_bytes > MAX_IMAGE_BYTES {
        return Err(SafetyError::ImageTooLarge {
            size: size_bytes,
            max: MAX_IMAGE_BYTES,
        });
    }
    Ok(())
}

/// Image requests must point at an uploaded image. Other input kinds carry
/// no image requirement.
pub fn require_image_reference(
    input_kind: InputKind,
    image_ref: Option<&str>,
) -> Result<(), SafetyError> {
    match (input_kind, image_ref.map(str::trim)) {
        (InputKind::Image, None) | (InputKind::Image, Some("")) => {
            Err(SafetyError::MissingImageReference)
        }
        _ => Ok(()),
    }
}
