//! Extraction through the Gemini `generateContent` API.

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info};

use super::{ExtractionGateway, Result, parse_model_output};
use crate::error::ExtractionError;
use crate::models::config::ExtractionConfig;
use crate::models::record::InvoiceRecord;
use crate::pdf::{PDF_MIME, PdfInput};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Instruction sent alongside each PDF.
const EXTRACTION_PROMPT: &str = r#"You extract data from invoices, most of them written in Slovenian.

From the attached PDF invoice, read:
- the invoice number (invoiceNumber)
- the invoice date exactly as printed (invoiceDate)
- the issuer's name, address, phone number and email (providerName, providerAddress, providerPhone, providerEmail)
- the total amount payable including currency (invoiceValue)

Return a single JSON object with exactly these seven string fields.
Use an empty string for anything that is not on the invoice. Do not add commentary."#;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    response_mime_type: String,
    response_schema: Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

/// Gateway calling a hosted Gemini model.
pub struct GeminiGateway {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
}

impl GeminiGateway {
    /// Create a gateway with an explicit API key.
    ///
    /// Only connecting is bounded here. The per-file deadline comes from the
    /// batch, so an expiry surfaces as [`ExtractionError::Timeout`].
    pub fn new(config: &ExtractionConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT.min(config.timeout()))
            .build()
            .map_err(|e| ExtractionError::Request(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: api_key.into(),
        })
    }

    /// Create a gateway reading the API key from the configured environment variable.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self> {
        let api_key = std::env::var(&config.api_key_env).map_err(|_| {
            ExtractionError::MissingConfig(format!(
                "{} environment variable is not set",
                config.api_key_env
            ))
        })?;

        info!(url = %config.base_url, model = %config.model, "Using Gemini extraction gateway");
        Self::new(config, api_key)
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn build_request(pdf: &PdfInput) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![
                    Part {
                        text: Some(EXTRACTION_PROMPT.to_string()),
                        inline_data: None,
                    },
                    Part {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: PDF_MIME.to_string(),
                            data: STANDARD.encode(&pdf.data),
                        }),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        }
    }
}

/// Schema with the seven required string fields.
fn response_schema() -> Value {
    let fields = [
        "invoiceNumber",
        "invoiceDate",
        "providerName",
        "providerAddress",
        "providerPhone",
        "providerEmail",
        "invoiceValue",
    ];
    let properties: serde_json::Map<String, Value> = fields
        .iter()
        .map(|f| (f.to_string(), json!({ "type": "STRING" })))
        .collect();

    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": fields,
    })
}

/// Text of the first candidate.
fn first_text(response: GenerateResponse) -> Result<String> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ExtractionError::EmptyResponse);
    }
    Ok(text)
}

#[async_trait]
impl ExtractionGateway for GeminiGateway {
    async fn extract(&self, pdf: &PdfInput) -> Result<InvoiceRecord> {
        let request = Self::build_request(pdf);

        debug!(file = %pdf.name, bytes = pdf.data.len(), model = %self.model, "Sending PDF for extraction");

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ExtractionError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::InvalidResponse(e.to_string()))?;

        parse_model_output(&first_text(body)?)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
