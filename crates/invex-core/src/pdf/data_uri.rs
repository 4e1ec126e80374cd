//! Self-describing `data:<mime>;base64,<payload>` URIs.

use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::Result;
use crate::error::PdfError;

/// A decoded data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUri {
    /// MIME type, e.g. `application/pdf`.
    pub mime: String,
    /// Decoded payload.
    pub data: Vec<u8>,
}

impl DataUri {
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }

    /// Encode bytes as a data URI string without building an intermediate value.
    pub fn encode(mime: &str, data: &[u8]) -> String {
        format!("data:{};base64,{}", mime, STANDARD.encode(data))
    }

    /// Parse a base64 data URI.
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .trim()
            .strip_prefix("data:")
            .ok_or_else(|| PdfError::InvalidDataUri("missing 'data:' prefix".to_string()))?;

        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| PdfError::InvalidDataUri("missing ',' separator".to_string()))?;

        let mut params = meta.split(';');
        let mime = params.next().unwrap_or_default();
        if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
            return Err(PdfError::InvalidDataUri("only base64 payloads are supported".to_string()));
        }

        let data = STANDARD
            .decode(payload)
            .map_err(|e| PdfError::InvalidDataUri(e.to_string()))?;

        let mime = if mime.is_empty() { "text/plain" } else { mime };
        Ok(Self::new(mime, data))
    }

    /// Base64 payload.
    pub fn payload_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

impl fmt::Display for DataUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime, self.payload_base64())
    }
}
