//! Transaction-related types for the transaction service
//!
//! This module defines the stored transaction entity, the request shape that a
//! boundary layer hands to the service, and the closed sets of currencies and
//! transaction types accepted by validation.

use super::error::InvalidInputKind;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Maximum description length, counted in characters
pub const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Opaque transaction identifier
///
/// Generated ids are time-ordered UUIDs, so two transactions created within the
/// same clock tick still compare in creation order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    /// Generate a fresh, globally unique identifier
    pub fn generate() -> Self {
        TransactionId(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for TransactionId {
    fn from(value: String) -> Self {
        TransactionId(value)
    }
}

impl From<&str> for TransactionId {
    fn from(value: &str) -> Self {
        TransactionId(value.to_string())
    }
}

impl Borrow<str> for TransactionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Currencies accepted by the service
///
/// Input codes are matched case-insensitively but not trimmed; the stored and
/// serialized form is always the uppercase ISO code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Eur,
    Gbp,
    Jpy,
    Cny,
    Hkd,
    Sgd,
    Aud,
    Cad,
    Chf,
}

impl Currency {
    pub const ALL: [Currency; 10] = [
        Currency::Usd,
        Currency::Eur,
        Currency::Gbp,
        Currency::Jpy,
        Currency::Cny,
        Currency::Hkd,
        Currency::Sgd,
        Currency::Aud,
        Currency::Cad,
        Currency::Chf,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
            Currency::Jpy => "JPY",
            Currency::Cny => "CNY",
            Currency::Hkd => "HKD",
            Currency::Sgd => "SGD",
            Currency::Aud => "AUD",
            Currency::Cad => "CAD",
            Currency::Chf => "CHF",
        }
    }
}

impl FromStr for Currency {
    type Err = InvalidInputKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.to_uppercase();
        Currency::ALL
            .into_iter()
            .find(|currency| currency.code() == code)
            .ok_or(InvalidInputKind::InvalidCurrency)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Transaction types accepted by the service
///
/// Like currencies, these are matched case-insensitively at input and stored
/// in their uppercase form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    /// Funds credited to the owner
    Deposit,
    /// Funds debited from the owner
    Withdrawal,
    /// Funds moved between two parties
    Transfer,
    /// Settlement of a purchase
    Payment,
    /// Reversal of an earlier payment
    Refund,
}

impl TransactionType {
    pub const ALL: [TransactionType; 5] = [
        TransactionType::Deposit,
        TransactionType::Withdrawal,
        TransactionType::Transfer,
        TransactionType::Payment,
        TransactionType::Refund,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            TransactionType::Deposit => "DEPOSIT",
            TransactionType::Withdrawal => "WITHDRAWAL",
            TransactionType::Transfer => "TRANSFER",
            TransactionType::Payment => "PAYMENT",
            TransactionType::Refund => "REFUND",
        }
    }
}

impl FromStr for TransactionType {
    type Err = InvalidInputKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.to_uppercase();
        TransactionType::ALL
            .into_iter()
            .find(|tx_type| tx_type.name() == name)
            .ok_or(InvalidInputKind::InvalidTransactionType)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Proposed transaction fields, as received from a boundary layer
///
/// Every field is optional here because absence is a validation outcome, not a
/// deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRequest {
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub transaction_type: Option<String>,
    pub description: Option<String>,
    pub reference_number: Option<String>,
}

impl TransactionRequest {
    /// Create a request with the three mandatory fields set
    pub fn new(amount: Decimal, currency: &str, transaction_type: &str) -> Self {
        TransactionRequest {
            amount: Some(amount),
            currency: Some(currency.to_string()),
            transaction_type: Some(transaction_type.to_string()),
            description: None,
            reference_number: None,
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_reference_number(mut self, reference_number: &str) -> Self {
        self.reference_number = Some(reference_number.to_string());
        self
    }

    /// The reference number if it takes part in uniqueness checks
    pub fn indexed_reference(&self) -> Option<&str> {
        indexed_reference(self.reference_number.as_deref())
    }
}

/// Stored transaction entity
///
/// `id` and `timestamp` are assigned once at creation. Every other field is
/// replaced wholesale by an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,

    /// Strictly positive amount
    pub amount: Decimal,

    pub currency: Currency,

    pub transaction_type: TransactionType,

    /// Creation instant, the sole ordering key for listings
    pub timestamp: DateTime<Utc>,

    pub description: Option<String>,

    /// Caller-supplied reference, unique among live transactions when non-blank
    pub reference_number: Option<String>,
}

impl Transaction {
    /// The reference number if it takes part in uniqueness checks
    pub fn indexed_reference(&self) -> Option<&str> {
        indexed_reference(self.reference_number.as_deref())
    }
}

/// Blank reference numbers are never indexed
pub fn indexed_reference(reference_number: Option<&str>) -> Option<&str> {
    reference_number.filter(|reference| !reference.trim().is_empty())
}
