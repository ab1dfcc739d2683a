//! Upload validation — cheap checks performed before a workflow run.

use crate::api::error::ApiError;

/// Hard cap on uploaded file size (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// PDF files begin with this magic.
const PDF_MAGIC: &[u8] = b"%PDF-";

/// Validate an uploaded document before it enters the workflow.
///
/// Only PDF is accepted. The magic bytes are authoritative; filename and
/// content type are checked so an obviously mislabelled upload fails with
/// a clear message instead of a parse error deep in extraction.
pub fn check_upload(filename: &str, content_type: &str, bytes: &[u8]) -> Result<(), ApiError> {
    if bytes.is_empty() {
        return Err(ApiError::BadRequest("Uploaded file is empty".into()));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(ApiError::PayloadTooLarge(bytes.len()));
    }

    let named_pdf = filename.to_ascii_lowercase().ends_with(".pdf");
    let typed_pdf = content_type.eq_ignore_ascii_case("application/pdf")
        || content_type.eq_ignore_ascii_case("application/octet-stream")
        || content_type.is_empty();
    if !named_pdf && !content_type.eq_ignore_ascii_case("application/pdf") {
        return Err(ApiError::UnsupportedMedia(format!(
            "Only PDF uploads are supported, got '{filename}'"
        )));
    }
    if !typed_pdf {
        return Err(ApiError::UnsupportedMedia(format!(
            "Only PDF uploads are supported, got content type '{content_type}'"
        )));
    }

    if !bytes.starts_with(PDF_MAGIC) {
        return Err(ApiError::UnsupportedMedia(
            "File content is not a PDF".into(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf_bytes() -> Vec<u8> {
        b"%PDF-1.4 minimal".to_vec()
    }

    #[test]
    fn valid_pdf_passes() {
        assert!(check_upload("labs.pdf", "application/pdf", &pdf_bytes()).is_ok());
    }

    #[test]
    fn pdf_with_generic_content_type_passes() {
        assert!(check_upload("labs.pdf", "application/octet-stream", &pdf_bytes()).is_ok());
        assert!(check_upload("labs.pdf", "", &pdf_bytes()).is_ok());
    }

    #[test]
    fn empty_file_is_bad_request() {
        let err = check_upload("labs.pdf", "application/pdf", &[]).unwrap_err();
        assert!(matches!(err, ApiError::BadRequest(_)));
    }

    #[test]
    fn oversized_file_is_rejected() {
        let mut bytes = pdf_bytes();
        bytes.resize(MAX_UPLOAD_BYTES + 1, 0);
        let err = check_upload("labs.pdf", "application/pdf", &bytes).unwrap_err();
        assert!(matches!(err, ApiError::PayloadTooLarge(_)));
    }

    #[test]
    fn non_pdf_extension_and_type_is_rejected() {
        let err = check_upload("notes.docx", "application/msword", &pdf_bytes()).unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedMedia(_)));
    }

    #[test]
    fn wrong_magic_is_rejected() {
        let err = check_upload("labs.pdf", "application/pdf", b"PK\x03\x04zip").unwrap_err();
        assert!(matches!(err, ApiError::UnsupportedMedia(_)));
    }
}
