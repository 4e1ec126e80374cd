//! Extracted invoice records.

use serde::{Deserialize, Serialize};

/// Placeholder rendered in place of empty fields.
pub const PLACEHOLDER: &str = "N/A";

/// One extracted invoice.
///
/// All values are kept as the text the extractor produced; dates and amounts
/// are never parsed on the way in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    /// Invoice number as printed. Not unique on its own.
    #[serde(default)]
    pub invoice_number: String,

    /// Invoice date, free-form.
    #[serde(default)]
    pub invoice_date: String,

    /// Issuer name.
    #[serde(default)]
    pub provider_name: String,

    /// Issuer address.
    #[serde(default)]
    pub provider_address: String,

    /// Issuer phone number.
    #[serde(default)]
    pub provider_phone: String,

    /// Issuer email address.
    #[serde(default)]
    pub provider_email: String,

    /// Total value, including any currency text.
    #[serde(default)]
    pub invoice_value: String,

    /// Source PDF as a data URI, kept for later viewing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_data_uri: Option<String>,
}

/// Natural key of an invoice: number plus date.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
    pub invoice_number: String,
    pub invoice_date: String,
}

impl RecordKey {
    pub fn new(invoice_number: impl Into<String>, invoice_date: impl Into<String>) -> Self {
        Self {
            invoice_number: invoice_number.into(),
            invoice_date: invoice_date.into(),
        }
    }
}

impl std::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.invoice_number, self.invoice_date)
    }
}

/// The seven extracted fields, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    InvoiceNumber,
    InvoiceDate,
    ProviderName,
    ProviderAddress,
    ProviderPhone,
    ProviderEmail,
    InvoiceValue,
}

impl RecordField {
    /// Fields in single-invoice order (as on the extraction result card).
    pub const DETAIL_ORDER: [RecordField; 7] = [
        RecordField::InvoiceNumber,
        RecordField::InvoiceDate,
        RecordField::ProviderName,
        RecordField::ProviderAddress,
        RecordField::ProviderPhone,
        RecordField::ProviderEmail,
        RecordField::InvoiceValue,
    ];

    /// Fields in table order, provider first.
    pub const TABLE_ORDER: [RecordField; 7] = [
        RecordField::ProviderName,
        RecordField::InvoiceNumber,
        RecordField::InvoiceDate,
        RecordField::ProviderAddress,
        RecordField::ProviderPhone,
        RecordField::ProviderEmail,
        RecordField::InvoiceValue,
    ];

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            RecordField::InvoiceNumber => "Invoice Number",
            RecordField::InvoiceDate => "Invoice Date",
            RecordField::ProviderName => "Provider Name",
            RecordField::ProviderAddress => "Provider Address",
            RecordField::ProviderPhone => "Provider Phone",
            RecordField::ProviderEmail => "Provider Email",
            RecordField::InvoiceValue => "Invoice Value",
        }
    }
}

impl InvoiceRecord {
    /// The record's natural key.
    pub fn key(&self) -> RecordKey {
        RecordKey::new(&self.invoice_number, &self.invoice_date)
    }

    /// Check whether this record has the given key, without allocating.
    pub fn has_key(&self, invoice_number: &str, invoice_date: &str) -> bool {
        self.invoice_number == invoice_number && self.invoice_date == invoice_date
    }

    /// Raw value of a field.
    pub fn field(&self, field: RecordField) -> &str {
        match field {
            RecordField::InvoiceNumber => &self.invoice_number,
            RecordField::InvoiceDate => &self.invoice_date,
            RecordField::ProviderName => &self.provider_name,
            RecordField::ProviderAddress => &self.provider_address,
            RecordField::ProviderPhone => &self.provider_phone,
            RecordField::ProviderEmail => &self.provider_email,
            RecordField::InvoiceValue => &self.invoice_value,
        }
    }

    /// Field value for display, substituting `placeholder` when blank.
    pub fn display_field<'a>(&'a self, field: RecordField, placeholder: &'a str) -> &'a str {
        let value = self.field(field);
        if value.trim().is_empty() { placeholder } else { value }
    }

    /// Whether every extracted field is blank.
    pub fn is_blank(&self) -> bool {
        RecordField::DETAIL_ORDER
            .iter()
            .all(|f| self.field(*f).trim().is_empty())
    }

    /// Drop the retained source document.
    pub fn without_pdf(mut self) -> Self {
        self.pdf_data_uri = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_camel_case_layout() {
        let record = InvoiceRecord {
            invoice_number: "2024-17".to_string(),
            invoice_date: "01.02.2024".to_string(),
            provider_name: "Acme d.o.o.".to_string(),
            invoice_value: "120,00 EUR".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["invoiceNumber"], "2024-17");
        assert_eq!(json["invoiceDate"], "01.02.2024");
        assert_eq!(json["providerName"], "Acme d.o.o.");
        assert_eq!(json["invoiceValue"], "120,00 EUR");
        assert!(json.get("pdfDataUri").is_none());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let record: InvoiceRecord =
            serde_json::from_str(r#"{"invoiceNumber":"7","providerName":"Acme"}"#).unwrap();
        assert_eq!(record.invoice_number, "7");
        assert_eq!(record.invoice_date, "");
        assert_eq!(record.provider_email, "");
        assert_eq!(record.pdf_data_uri, None);
    }

    #[test]
    fn test_display_field_placeholder() {
        let record = InvoiceRecord {
            provider_phone: "  ".to_string(),
            provider_name: "Acme".to_string(),
            ..Default::default()
        };
        assert_eq!(record.display_field(RecordField::ProviderPhone, PLACEHOLDER), "N/A");
        assert_eq!(record.display_field(RecordField::ProviderName, PLACEHOLDER), "Acme");
    }

    #[test]
    fn test_key_ignores_provider() {
        let a = InvoiceRecord {
            invoice_number: "123".to_string(),
            invoice_date: "01.02.2024".to_string(),
            provider_name: "Acme".to_string(),
            ..Default::default()
        };
        let b = InvoiceRecord {
            provider_name: "Acme Corp".to_string(),
            ..a.clone()
        };
        assert_eq!(a.key(), b.key());
        assert!(b.has_key("123", "01.02.2024"));
        assert!(!b.has_key("123", "02.02.2024"));
    }
}
