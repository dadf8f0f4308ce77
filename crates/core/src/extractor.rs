use crate::error::IngestError;
use crate::models::UploadedDocument;
use lopdf::Document;

/// Pulls raw text out of one uploaded PDF. Behind a trait so the processing
/// pipeline can be exercised without real PDF bytes.
pub trait PdfExtractor {
    fn extract_text(&self, document: &UploadedDocument) -> Result<String, IngestError>;
}

#[derive(Default)]
pub struct LopdfExtractor;

impl PdfExtractor for LopdfExtractor {
    fn extract_text(&self, document: &UploadedDocument) -> Result<String, IngestError> {
        let parsed = Document::load_mem(&document.bytes)
            .map_err(|error| IngestError::PdfParse(format!("{}: {error}", document.name)))?;

        let mut text = String::new();
        for (page_no, _page_id) in parsed.get_pages() {
            let page_text = parsed
                .extract_text(&[page_no])
                .map_err(|error| IngestError::PdfParse(format!("{}: {error}", document.name)))?;
            text.push_str(&page_text);
        }

        if text.trim().is_empty() {
            return Err(IngestError::PdfParse(format!(
                "pdf had no readable page text: {}",
                document.name
            )));
        }

        Ok(text)
    }
}

/// Concatenates extracted text across all documents of one processing
/// request, in document order with page order preserved inside each.
/// Any unreadable document fails the whole batch.
pub fn extract_raw_text<X: PdfExtractor>(
    extractor: &X,
    documents: &[UploadedDocument],
) -> Result<String, IngestError> {
    let mut raw = String::new();
    for document in documents {
        raw.push_str(&extractor.extract_text(document)?);
    }
    Ok(raw)
}
