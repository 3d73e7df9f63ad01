//! Upload validation: size cap and filename sanitization.

use crate::error::AppError;

/// Hard cap on a single uploaded file. A file of exactly this size is
/// accepted; one byte more is rejected.
pub const MAX_UPLOAD_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Validate the size of an uploaded file against the cap.
pub fn validate_file_size(file_size: usize, max_size: usize) -> Result<(), AppError> {
    if file_size == 0 {
        return Err(AppError::InvalidInput("File is empty".to_string()));
    }
    if file_size > max_size {
        return Err(AppError::PayloadTooLarge(format!(
            "File size {} bytes exceeds the {} byte limit",
            file_size, max_size
        )));
    }
    Ok(())
}

/// Make a filename safe for use in a storage key: whitespace collapses to
/// underscores, path separators and control characters are stripped.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !c.is_control() && *c != '/' && *c != '\\')
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect();
    let trimmed = cleaned.trim_matches(['.', '_']).to_string();
    if trimmed.is_empty() {
        "file".to_string()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_cap_accepted_one_more_rejected() {
        assert!(validate_file_size(MAX_UPLOAD_SIZE_BYTES, MAX_UPLOAD_SIZE_BYTES).is_ok());
        let err =
            validate_file_size(MAX_UPLOAD_SIZE_BYTES + 1, MAX_UPLOAD_SIZE_BYTES).unwrap_err();
        assert!(matches!(err, AppError::PayloadTooLarge(_)));
    }

    #[test]
    fn test_empty_file_rejected() {
        assert!(matches!(
            validate_file_size(0, MAX_UPLOAD_SIZE_BYTES),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(
            sanitize_filename("surat masuk 2025.pdf"),
            "surat_masuk_2025.pdf"
        );
        assert_eq!(sanitize_filename("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_filename("  "), "file");
    }
}
