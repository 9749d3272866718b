//! CSV format handling for transaction requests and listing output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to transaction requests
//! - Listing output serialization (CSV and JSON)
//!
//! All functions are pure (no file handling) for easy testing.

use crate::types::{ImportError, Page, Transaction, TransactionRequest};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns:
/// amount, currency, transactionType, description, referenceNumber.
/// Every column is optional; missing values surface as validation errors
/// from the service, not as parse errors here.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CsvRecord {
    pub amount: Option<String>,
    pub currency: Option<String>,
    pub transaction_type: Option<String>,
    pub description: Option<String>,
    pub reference_number: Option<String>,
}

/// Convert a CsvRecord to a TransactionRequest
///
/// Empty cells become `None`. Only the amount is parsed here; everything else
/// is left for the service to validate.
///
/// # Returns
///
/// * `Ok(TransactionRequest)` - Successfully converted record
/// * `Err(String)` - The amount cell is not a decimal number
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<TransactionRequest, String> {
    let amount = match non_empty(csv_record.amount) {
        Some(amount_str) => Some(
            Decimal::from_str(&amount_str)
                .map_err(|_| format!("Invalid amount '{}'", amount_str))?,
        ),
        None => None,
    };

    Ok(TransactionRequest {
        amount,
        currency: non_empty(csv_record.currency),
        transaction_type: non_empty(csv_record.transaction_type),
        description: non_empty(csv_record.description),
        reference_number: non_empty(csv_record.reference_number),
    })
}

fn non_empty(cell: Option<String>) -> Option<String> {
    cell.filter(|value| !value.trim().is_empty())
}

/// Write transactions in CSV format
///
/// Columns: id, amount, currency, transactionType, timestamp, description,
/// referenceNumber. Rows are written in the order given.
pub fn write_transactions_csv(
    transactions: &[Transaction],
    output: &mut dyn Write,
) -> Result<(), ImportError> {
    let mut writer = csv::Writer::from_writer(output);

    writer.write_record([
        "id",
        "amount",
        "currency",
        "transactionType",
        "timestamp",
        "description",
        "referenceNumber",
    ])?;

    for tx in transactions {
        let amount = tx.amount.to_string();
        let timestamp = tx.timestamp.to_rfc3339();
        writer.write_record([
            tx.id.as_str(),
            amount.as_str(),
            tx.currency.code(),
            tx.transaction_type.name(),
            timestamp.as_str(),
            tx.description.as_deref().unwrap_or_default(),
            tx.reference_number.as_deref().unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Write a listing page as pretty-printed JSON, in the HTTP response shape
pub fn write_page_json(
    listing: &Page<Transaction>,
    output: &mut dyn Write,
) -> Result<(), ImportError> {
    serde_json::to_writer_pretty(&mut *output, listing)?;
    writeln!(output)?;
    Ok(())
}
