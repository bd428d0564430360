use std::borrow::Cow;

use chrono::SecondsFormat;
use serde::Serialize;

use super::domain::InvoiceRecord;

const HEADER: [&str; 14] = [
    "id",
    "receiptType",
    "receiptNo",
    "date",
    "countryCode",
    "phoneCode",
    "mobileNo",
    "receivedFrom",
    "description",
    "theSumOf",
    "amount",
    "modeOfPayment",
    "hasSignature",
    "createdAt",
];

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceRow<'a> {
    id: &'a str,
    receipt_type: Cow<'a, str>,
    receipt_no: Cow<'a, str>,
    date: String,
    country_code: Cow<'a, str>,
    phone_code: Cow<'a, str>,
    mobile_no: Cow<'a, str>,
    received_from: Cow<'a, str>,
    description: Cow<'a, str>,
    the_sum_of: Cow<'a, str>,
    amount: f64,
    mode_of_payment: Cow<'a, str>,
    has_signature: bool,
    created_at: String,
}

impl<'a> From<&'a InvoiceRecord> for InvoiceRow<'a> {
    fn from(record: &'a InvoiceRecord) -> Self {
        Self {
            id: &record.id.0,
            receipt_type: inert_cell(&record.receipt_type),
            receipt_no: inert_cell(&record.receipt_no),
            date: record.date.to_rfc3339_opts(SecondsFormat::Millis, true),
            country_code: inert_cell(&record.country_code),
            phone_code: inert_cell(&record.phone_code),
            mobile_no: inert_cell(&record.mobile_no),
            received_from: inert_cell(&record.received_from),
            description: inert_cell(&record.description),
            the_sum_of: inert_cell(&record.the_sum_of),
            amount: record.amount,
            mode_of_payment: inert_cell(&record.mode_of_payment),
            has_signature: record.signature.is_some(),
            created_at: record
                .created_at
                .to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// Form text opens in spreadsheets, so a cell that would start a formula gets a
/// leading apostrophe.
fn inert_cell(value: &str) -> Cow<'_, str> {
    if value.starts_with(['=', '+', '-', '@', '\t', '\r']) {
        Cow::Owned(format!("'{value}"))
    } else {
        Cow::Borrowed(value)
    }
}

/// Renders receipts as CSV. The signature image is reduced to a flag.
pub fn write_csv(records: &[InvoiceRecord]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for record in records {
        writer.serialize(InvoiceRow::from(record))?;
    }
    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}
