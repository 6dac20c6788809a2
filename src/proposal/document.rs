//! Merged proposal data and the rendered artefact

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{PricingBreakdown, ProjectBrief, ProposalSections};
use crate::memory::ScoredCaseStudy;

pub const PDF_UNAVAILABLE_NOTE: &str = "PDF generation unavailable - HTML output provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Html,
}

impl DocumentFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Html => "html",
        }
    }
}

impl std::fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentFormat::Pdf => write!(f, "PDF"),
            DocumentFormat::Html => write!(f, "HTML"),
        }
    }
}

/// Output of the document stage. HTML is always present; the PDF only
/// when the renderer succeeded, otherwise `note` says why it is missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedDocument {
    pub format: DocumentFormat,
    #[serde(default, skip_serializing_if = "Option::is_none", with = "base64_bytes")]
    pub pdf_bytes: Option<Vec<u8>>,
    pub html_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl RenderedDocument {
    pub fn pdf(pdf_bytes: Vec<u8>, html_content: String) -> Self {
        Self {
            format: DocumentFormat::Pdf,
            pdf_bytes: Some(pdf_bytes),
            html_content,
            note: None,
        }
    }

    pub fn html_only(html_content: String) -> Self {
        Self {
            format: DocumentFormat::Html,
            pdf_bytes: None,
            html_content,
            note: Some(PDF_UNAVAILABLE_NOTE.to_string()),
        }
    }

    /// The downloadable bytes: the PDF when present, the HTML otherwise.
    pub fn artifact_bytes(&self) -> &[u8] {
        match &self.pdf_bytes {
            Some(bytes) => bytes,
            None => self.html_content.as_bytes(),
        }
    }
}

/// Brief plus the outputs of the pricing, writing and retrieval stages;
/// the input of the document stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedProposal {
    #[serde(flatten)]
    pub brief: ProjectBrief,
    pub pricing: PricingBreakdown,
    pub sections: ProposalSections,
    #[serde(default)]
    pub relevant_cases: Vec<ScoredCaseStudy>,
}

/// Payload of a successful run. Document fields are merged last.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalProposal {
    #[serde(flatten)]
    pub proposal: CombinedProposal,
    #[serde(flatten)]
    pub document: RenderedDocument,
    /// Reasons recorded by stages that fell back to degraded output.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub stage_notes: Vec<String>,
}

impl FinalProposal {
    /// `proposal_<Client_Name>.<ext>`, as offered for download.
    pub fn file_name(&self) -> String {
        let client = self.proposal.brief.client_name.as_deref().unwrap_or("client");
        format!("proposal_{}.{}", file_stem(client), self.document.format.extension())
    }

    /// Write the document and a timestamped JSON dump into `out`.
    ///
    /// Returns the two paths written, document first.
    pub async fn save(&self, out: &Path) -> Result<(PathBuf, PathBuf)> {
        tokio::fs::create_dir_all(out)
            .await
            .with_context(|| format!("Failed to create output directory {:?}", out))?;

        let document_path = out.join(self.file_name());
        tokio::fs::write(&document_path, self.document.artifact_bytes())
            .await
            .with_context(|| format!("Failed to write {:?}", document_path))?;

        let data_path = out.join(format!("proposal_data_{}.json", Local::now().format("%Y%m%d_%H%M%S")));
        let json = serde_json::to_string_pretty(self).context("Failed to serialize proposal data")?;
        tokio::fs::write(&data_path, json)
            .await
            .with_context(|| format!("Failed to write {:?}", data_path))?;

        Ok((document_path, data_path))
    }
}

/// Make `name` safe as a single path component.
///
/// Anything other than ASCII letters, digits, `-` and `_` becomes `_`.
pub fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if stem.is_empty() {
        "client".to_string()
    } else {
        stem
    }
}

/// Whatever a failed run had assembled before it stopped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PartialProposal {
    #[serde(flatten)]
    pub brief: ProjectBrief,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<PricingBreakdown>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sections: Option<ProposalSections>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevant_cases: Option<Vec<ScoredCaseStudy>>,
}

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => serializer.serialize_some(&STANDARD.encode(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
        let encoded: Option<String> = Option::deserialize(deserializer)?;
        encoded
            .map(|e| STANDARD.decode(e).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_bytes_serialize_as_base64() {
        let doc = RenderedDocument::pdf(b"%PDF-1.7".to_vec(), "<html></html>".into());
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["format"], "pdf");
        assert_eq!(value["pdf_bytes"], "JVBERi0xLjc=");
        assert!(value.get("note").is_none());

        let back: RenderedDocument = serde_json::from_value(value).unwrap();
        assert_eq!(back.pdf_bytes.as_deref(), Some(&b"%PDF-1.7"[..]));
    }

    #[test]
    fn test_file_stem_keeps_names_in_one_component() {
        assert_eq!(file_stem("Acme Retail"), "Acme_Retail");
        assert_eq!(file_stem("Smith/Jones LLC"), "Smith_Jones_LLC");
        assert_eq!(file_stem("../../etc/passwd"), "______etc_passwd");
        assert_eq!(file_stem("Café\\Co"), "Caf__Co");
        assert_eq!(file_stem("   "), "client");
        assert!(!file_stem("..").contains('.'));
    }

    #[test]
    fn test_html_only_carries_note() {
        let doc = RenderedDocument::html_only("<p>hi</p>".into());
        assert_eq!(doc.format, DocumentFormat::Html);
        assert_eq!(doc.note.as_deref(), Some(PDF_UNAVAILABLE_NOTE));
        assert_eq!(doc.artifact_bytes(), b"<p>hi</p>");
        assert!(serde_json::to_value(&doc).unwrap().get("pdf_bytes").is_none());
    }
}
