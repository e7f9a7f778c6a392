//! Raw API payloads
//!
//! Ledger entries are kept as loose JSON objects: the API is not trusted to
//! send every field, or to send them with consistent types.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{EtlError, EtlResult};

/// `{ "data": { "items": [...] } }` wrapper used by every endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ItemsEnvelope<T> {
    #[serde(default = "ItemsPage::empty")]
    pub data: ItemsPage<T>,
}

/// The `data` member of an [`ItemsEnvelope`]
#[derive(Debug, Clone, Deserialize)]
pub struct ItemsPage<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> ItemsPage<T> {
    fn empty() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T> ItemsEnvelope<T> {
    /// Consume the envelope, returning its items
    pub fn into_items(self) -> Vec<T> {
        self.data.items
    }
}

/// One chart-of-accounts node
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AccountPlanItem {
    #[serde(default, deserialize_with = "lenient_text")]
    pub codigo: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub nombre: String,
    /// Hierarchy level, sent as a number or numeric text
    #[serde(default)]
    pub nivel: Value,
}

impl AccountPlanItem {
    /// Hierarchy level, when it can be read
    pub fn level(&self) -> Option<i64> {
        match &self.nivel {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

/// A posted ledger line exactly as the API returned it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawLedgerEntry(Map<String, Value>);

impl RawLedgerEntry {
    /// Wrap an already-parsed JSON object
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Build an entry from a JSON value, rejecting non-objects
    pub fn from_value(value: Value) -> EtlResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(EtlError::Json(format!(
                "Ledger entry is not an object: {}",
                other
            ))),
        }
    }

    /// Text field, with numbers rendered as text and anything else empty
    pub fn text(&self, field: &str) -> String {
        self.0.get(field).map(value_text).unwrap_or_default()
    }

    /// Composite `codigo + nombre` account field
    pub fn account(&self) -> String {
        self.text("cuenta")
    }

    /// Free-text description of the entry
    pub fn details(&self) -> String {
        self.text("detalles")
    }

    /// Whether the entry carries an opening balance rather than activity
    pub fn is_opening_balance(&self) -> bool {
        self.details().to_lowercase().contains("apertura")
    }

    /// Numeric field as a decimal
    ///
    /// Missing, null and non-numeric values are a [`EtlError::MalformedEntry`].
    pub fn amount(&self, field: &'static str) -> EtlResult<Decimal> {
        let parsed = match self.0.get(field) {
            Some(Value::Number(n)) => number_to_decimal(n),
            Some(Value::String(s)) => Decimal::from_str(s.trim()).ok(),
            _ => None,
        };

        parsed.ok_or_else(|| EtlError::MalformedEntry {
            field,
            entry: self.describe(),
        })
    }

    /// Short identification for log lines and errors
    pub fn describe(&self) -> String {
        let voucher = self.text("numero_asiento");
        let account = self.account();
        match (voucher.is_empty(), account.is_empty()) {
            (false, false) => format!("asiento {} ({})", voucher, account.trim()),
            (false, true) => format!("asiento {}", voucher),
            (true, false) => format!("entry for {}", account.trim()),
            (true, true) => "unidentified entry".to_string(),
        }
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Accepts text, numbers or null where the API promises text
fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(|value| value_text(&value))
}

fn number_to_decimal(n: &serde_json::Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        Some(Decimal::from(i))
    } else if let Some(u) = n.as_u64() {
        Some(Decimal::from(u))
    } else {
        n.as_f64().and_then(|f| Decimal::try_from(f).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    fn entry(value: Value) -> RawLedgerEntry {
        RawLedgerEntry::from_value(value).unwrap()
    }

    #[test]
    fn test_envelope_parsing() {
        let body = r#"{"data": {"items": [{"codigo": "1101001001", "nombre": "Caja", "nivel": 4}]}}"#;
        let envelope: ItemsEnvelope<AccountPlanItem> = serde_json::from_str(body).unwrap();
        let items = envelope.into_items();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].codigo, "1101001001");
        assert_eq!(items[0].level(), Some(4));
    }

    #[test]
    fn test_plan_level_as_text() {
        let item: AccountPlanItem =
            serde_json::from_str(r#"{"codigo": "11", "nombre": "Activo", "nivel": "1"}"#).unwrap();
        assert_eq!(item.level(), Some(1));

        let item: AccountPlanItem = serde_json::from_str(r#"{"codigo": "11"}"#).unwrap();
        assert_eq!(item.level(), None);
    }

    #[test]
    fn test_plan_tolerates_null_and_numeric_text_fields() {
        let body = r#"{"data": {"items": [
            {"codigo": "1", "nombre": null, "nivel": 1},
            {"codigo": 1101001001, "nombre": "Caja", "nivel": 4}
        ]}}"#;
        let envelope: ItemsEnvelope<AccountPlanItem> = serde_json::from_str(body).unwrap();
        let items = envelope.into_items();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].nombre, "");
        assert_eq!(items[1].codigo, "1101001001");
        assert_eq!(items[1].nombre, "Caja");
    }

    #[test]
    fn test_envelope_without_data() {
        let envelope: ItemsEnvelope<RawLedgerEntry> = serde_json::from_str("{}").unwrap();
        assert!(envelope.into_items().is_empty());
    }

    #[test]
    fn test_amount_accepts_numbers_and_numeric_text() {
        let e = entry(json!({"credito": 1500, "debito": "250.50", "otro": 12.25}));
        assert_eq!(e.amount("credito").unwrap(), Decimal::from(1500));
        assert_eq!(e.amount("debito").unwrap(), Decimal::new(25050, 2));
    }

    #[test]
    fn test_amount_missing_is_malformed() {
        let e = entry(json!({"credito": 10, "debito": null, "numero_asiento": 42}));
        let err = e.amount("debito").unwrap_err();
        assert!(err.is_malformed());
        assert!(err.to_string().contains("debito"));
        assert!(err.to_string().contains("asiento 42"));

        assert!(e.amount("haber").is_err());
    }

    #[test]
    fn test_opening_balance_detection() {
        assert!(entry(json!({"detalles": "Asiento de APERTURA 2024"})).is_opening_balance());
        assert!(entry(json!({"detalles": "reapertura de caja"})).is_opening_balance());
        assert!(!entry(json!({"detalles": "Pago proveedor"})).is_opening_balance());
        assert!(!entry(json!({})).is_opening_balance());
    }

    #[test]
    fn test_text_coercion() {
        let e = entry(json!({"numero_asiento": 981, "contraparte": null}));
        assert_eq!(e.text("numero_asiento"), "981");
        assert_eq!(e.text("contraparte"), "");
    }

    #[test]
    fn test_non_object_rejected() {
        assert!(RawLedgerEntry::from_value(json!([1, 2])).is_err());
    }
}
