use std::borrow::Cow;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;

/// Default `tipoDocumento` code for a petition.
pub const DEFAULT_DOCUMENT_TYPE: &str = "58";

/// Body of a notice content query, exactly as received.
///
/// Owned by the call that produced it and dropped after extraction.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Pull the document text out of the multipart body.
    pub fn extract(&self) -> teor::Result<String> {
        teor::extract_bytes(&self.body)
    }
}

/// A pre-signed document ready to be filed.
///
/// The content is sent as-is (base64 in the envelope); signing happens
/// before this tool ever sees the file.
#[derive(Debug, Clone)]
pub struct SignedDocument {
    pub content: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
    /// `tipoDocumento` code from the court's document type table
    pub document_type: String,
    /// Free text sent as `descricao`; defaults to the file name
    pub description: Option<String>,
}

impl SignedDocument {
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        let file_name = file_name.into();
        Self {
            mime_type: mime_type_for(&file_name).to_string(),
            file_name,
            content,
            document_type: DEFAULT_DOCUMENT_TYPE.to_string(),
            description: None,
        }
    }

    /// Read a signed document from disk, inferring the mime type.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(file_name, content))
    }

    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    pub fn with_document_type(mut self, document_type: impl Into<String>) -> Self {
        self.document_type = document_type.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or(&self.file_name)
    }
}

fn mime_type_for(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "pdf" => "application/pdf",
        "html" | "htm" => "text/html",
        _ => "application/octet-stream",
    }
}

/// Acknowledgement of an accepted filing.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilingReceipt {
    /// `protocoloRecebimento`
    pub protocol: Option<String>,
    /// `mensagem`
    pub message: String,
    /// `dataOperacao`, as sent by the service
    pub received_at: Option<String>,
}
