//! Parsing of model output into invoice records.

use serde_json::{Map, Value};

use super::Result;
use crate::error::ExtractionError;
use crate::models::record::InvoiceRecord;

/// Parse the text a model produced into an invoice record.
///
/// Tolerates markdown fences and surrounding prose. String values are
/// trimmed, so the natural key never carries stray whitespace. Null or
/// missing fields become empty strings; numeric values are kept as their
/// textual form.
pub fn parse_model_output(content: &str) -> Result<InvoiceRecord> {
    let trimmed = content
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    if trimmed.is_empty() {
        return Err(ExtractionError::EmptyResponse);
    }

    let object = extract_json_object(trimmed)?;
    let fields: Map<String, Value> = serde_json::from_str(object)
        .map_err(|e| ExtractionError::InvalidResponse(format!("{e}: {object}")))?;

    let text = |key: &str| match fields.get(key) {
        Some(Value::String(s)) => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    };

    Ok(InvoiceRecord {
        invoice_number: text("invoiceNumber"),
        invoice_date: text("invoiceDate"),
        provider_name: text("providerName"),
        provider_address: text("providerAddress"),
        provider_phone: text("providerPhone"),
        provider_email: text("providerEmail"),
        invoice_value: text("invoiceValue"),
        pdf_data_uri: None,
    })
}

/// Outermost `{ ... }` span of the text.
fn extract_json_object(s: &str) -> Result<&str> {
    let start = s
        .find('{')
        .ok_or_else(|| ExtractionError::InvalidResponse("no JSON object in response".to_string()))?;
    let end = s
        .rfind('}')
        .ok_or_else(|| ExtractionError::InvalidResponse("no JSON object in response".to_string()))?;
    if end <= start {
        return Err(ExtractionError::InvalidResponse("malformed JSON object".to_string()));
    }
    Ok(&s[start..=end])
}
