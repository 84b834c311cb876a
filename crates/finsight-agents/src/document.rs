use std::path::Path;

use lopdf::Document;
use tracing::debug;

use crate::error::AgentError;

/// Whether an uploaded file name is accepted for document analysis.
pub fn is_pdf_file_name(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Extract the text of every page, in page order, joined by newlines.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, AgentError> {
    let document = Document::load_mem(bytes)?;
    let pages = document.get_pages();

    let mut texts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        texts.push(document.extract_text(&[*page_number])?);
    }

    debug!(pages = texts.len(), "Extracted PDF text");
    Ok(texts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::pdf_with_pages;

    #[test]
    fn pdf_extension_check() {
        assert!(is_pdf_file_name("annual_report.pdf"));
        assert!(is_pdf_file_name("reports/Q3.PDF"));
        assert!(!is_pdf_file_name("statement.txt"));
        assert!(!is_pdf_file_name("pdf"));
        assert!(!is_pdf_file_name("archive.pdf.zip"));
    }

    #[test]
    fn extracts_text_from_all_pages() {
        let bytes = pdf_with_pages(&["Revenue: $1,234.56", "Total Debt: $500"]).unwrap();
        let text = extract_pdf_text(&bytes).unwrap();
        assert!(text.contains("Revenue"));
        assert!(text.contains("Debt"));
        assert!(text.find("Revenue") < text.find("Debt"));
    }

    #[test]
    fn garbage_bytes_are_a_pdf_error() {
        let result = extract_pdf_text(b"definitely not a pdf");
        assert!(matches!(result, Err(AgentError::Pdf(_))));
    }
}
