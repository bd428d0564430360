use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_COUNTRY_CODE: &str = "IN";
pub const DEFAULT_PHONE_CODE: &str = "+91";

/// Document identifier, 24 lowercase hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceId(pub String);

/// Stored payment receipt as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceRecord {
    #[serde(rename = "_id")]
    pub id: InvoiceId,
    pub receipt_type: String,
    pub receipt_no: String,
    pub date: DateTime<Utc>,
    pub country_code: String,
    pub phone_code: String,
    pub mobile_no: String,
    pub received_from: String,
    pub description: String,
    /// Amount written out in words.
    pub the_sum_of: String,
    pub amount: f64,
    pub mode_of_payment: String,
    /// Base64 encoded signature image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Receipt form payload. Every field is optional at the wire level so that missing
/// values can be reported together instead of failing on the first one. Text fields
/// also take numbers and booleans, and `amount` takes a numeric string, the same
/// conversions the form's document store applies.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceSubmission {
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub receipt_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub receipt_no: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub date: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub country_code: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub phone_code: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub mobile_no: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub received_from: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub the_sum_of: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_amount")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_optional_text")]
    pub mode_of_payment: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub signature: Option<String>,
}

/// Rejected receipt payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvoiceValidationError {
    #[error("Invoice validation failed: {}", describe_missing(.0))]
    MissingFields(Vec<&'static str>),
    #[error("Invoice validation failed: {0}")]
    Malformed(String),
}

impl InvoiceValidationError {
    pub fn missing_fields(&self) -> &[&'static str] {
        match self {
            InvoiceValidationError::MissingFields(fields) => fields,
            InvoiceValidationError::Malformed(_) => &[],
        }
    }
}

fn describe_missing(fields: &[&'static str]) -> String {
    fields
        .iter()
        .map(|field| format!("{field}: Path `{field}` is required."))
        .collect::<Vec<_>>()
        .join(", ")
}

fn present_text(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|value| !value.is_empty())
}

impl InvoiceSubmission {
    /// Required fields that are absent or empty, in form order.
    pub fn missing_required(&self) -> Vec<&'static str> {
        let checks = [
            ("receiptType", present_text(&self.receipt_type)),
            ("receiptNo", present_text(&self.receipt_no)),
            ("mobileNo", present_text(&self.mobile_no)),
            ("receivedFrom", present_text(&self.received_from)),
            ("description", present_text(&self.description)),
            ("theSumOf", present_text(&self.the_sum_of)),
            ("amount", self.amount.is_some()),
            ("modeOfPayment", present_text(&self.mode_of_payment)),
        ];
        checks
            .into_iter()
            .filter(|(_, present)| !present)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn validate(&self) -> Result<(), InvoiceValidationError> {
        let missing = self.missing_required();
        if missing.is_empty() {
            Ok(())
        } else {
            Err(InvoiceValidationError::MissingFields(missing))
        }
    }

    /// Checks required fields and fills defaults, producing the record to persist.
    pub fn into_record(
        self,
        id: InvoiceId,
        now: DateTime<Utc>,
    ) -> Result<InvoiceRecord, InvoiceValidationError> {
        self.validate()?;

        Ok(InvoiceRecord {
            id,
            receipt_type: self.receipt_type.unwrap_or_default(),
            receipt_no: self.receipt_no.unwrap_or_default(),
            date: self.date.unwrap_or(now),
            country_code: self
                .country_code
                .unwrap_or_else(|| DEFAULT_COUNTRY_CODE.to_string()),
            phone_code: self
                .phone_code
                .unwrap_or_else(|| DEFAULT_PHONE_CODE.to_string()),
            mobile_no: self.mobile_no.unwrap_or_default(),
            received_from: self.received_from.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            the_sum_of: self.the_sum_of.unwrap_or_default(),
            amount: self.amount.unwrap_or_default(),
            mode_of_payment: self.mode_of_payment.unwrap_or_default(),
            signature: self.signature.filter(|value| !value.is_empty()),
            created_at: now,
        })
    }
}

/// Parses an RFC 3339 timestamp or a bare `YYYY-MM-DD` date (midnight UTC).
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(raw) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
        .ok_or_else(|| format!("Cast to date failed for value \"{raw}\""))
}

fn deserialize_optional_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    opt.filter(|value| !value.trim().is_empty())
        .map(|value| parse_timestamp(&value).map_err(serde::de::Error::custom))
        .transpose()
}

/// Text field that also takes numbers and booleans. Objects and arrays are rejected.
fn deserialize_optional_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(Value::Bool(flag)) => Ok(Some(flag.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "Cast to string failed for value {other}"
        ))),
    }
}

/// Amount given as a number or a numeric string. A blank string counts as absent.
fn deserialize_optional_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    let amount = match &value {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) if text.trim().is_empty() => return Ok(None),
        Some(Value::String(text)) => text.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match (amount, value) {
        (Some(amount), _) if amount.is_finite() => Ok(Some(amount)),
        (_, Some(value)) => Err(serde::de::Error::custom(format!(
            "Cast to Number failed for value {value}"
        ))),
        (_, None) => Ok(None),
    }
}
