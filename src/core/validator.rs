//! Business-rule validation for proposed transactions
//!
//! Pure functions with no side effects. Checks run in a fixed order (amount,
//! currency, transaction type, description) and the first failure wins.

use crate::types::{
    Currency, InvalidInputKind, TransactionRequest, TransactionType, MAX_DESCRIPTION_LENGTH,
};
use rust_decimal::Decimal;

/// Normalized mandatory fields of a request that passed validation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidFields {
    pub amount: Decimal,
    pub currency: Currency,
    pub transaction_type: TransactionType,
}

/// Validate a request's fields
///
/// # Returns
///
/// * `Ok(ValidFields)` - The amount plus the parsed currency and type
/// * `Err(InvalidInputKind)` - The first rule the request violates
pub fn validate(request: &TransactionRequest) -> Result<ValidFields, InvalidInputKind> {
    let amount = validate_amount(request.amount)?;
    let currency = validate_currency(request.currency.as_deref())?;
    let transaction_type = validate_transaction_type(request.transaction_type.as_deref())?;
    validate_description(request.description.as_deref())?;

    Ok(ValidFields {
        amount,
        currency,
        transaction_type,
    })
}

pub fn validate_amount(amount: Option<Decimal>) -> Result<Decimal, InvalidInputKind> {
    match amount {
        Some(amount) if amount > Decimal::ZERO => Ok(amount),
        _ => Err(InvalidInputKind::InvalidAmount),
    }
}

pub fn validate_currency(currency: Option<&str>) -> Result<Currency, InvalidInputKind> {
    currency
        .ok_or(InvalidInputKind::InvalidCurrency)?
        .parse()
}

pub fn validate_transaction_type(
    transaction_type: Option<&str>,
) -> Result<TransactionType, InvalidInputKind> {
    transaction_type
        .ok_or(InvalidInputKind::InvalidTransactionType)?
        .parse()
}

pub fn validate_description(description: Option<&str>) -> Result<(), InvalidInputKind> {
    match description {
        Some(text) if text.chars().count() > MAX_DESCRIPTION_LENGTH => {
            Err(InvalidInputKind::InvalidDescription)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn request(amount: Option<Decimal>, currency: Option<&str>, tx_type: Option<&str>) -> TransactionRequest {
        TransactionRequest {
            amount,
            currency: currency.map(str::to_string),
            transaction_type: tx_type.map(str::to_string),
            description: None,
            reference_number: None,
        }
    }

    #[test]
    fn test_valid_request_is_normalized() {
        let fields = validate(&request(Some(dec!(100.00)), Some("usd"), Some("deposit"))).unwrap();
        assert_eq!(fields.amount, dec!(100.00));
        assert_eq!(fields.currency, Currency::Usd);
        assert_eq!(fields.transaction_type, TransactionType::Deposit);
    }

    #[rstest]
    #[case::missing_amount(None, Some("USD"), Some("DEPOSIT"), InvalidInputKind::InvalidAmount)]
    #[case::zero_amount(Some(dec!(0)), Some("USD"), Some("DEPOSIT"), InvalidInputKind::InvalidAmount)]
    #[case::negative_amount(Some(dec!(-10.00)), Some("USD"), Some("DEPOSIT"), InvalidInputKind::InvalidAmount)]
    #[case::missing_currency(Some(dec!(1)), None, Some("DEPOSIT"), InvalidInputKind::InvalidCurrency)]
    #[case::blank_currency(Some(dec!(1)), Some("  "), Some("DEPOSIT"), InvalidInputKind::InvalidCurrency)]
    #[case::unknown_currency(Some(dec!(1)), Some("XXX"), Some("DEPOSIT"), InvalidInputKind::InvalidCurrency)]
    #[case::missing_type(Some(dec!(1)), Some("USD"), None, InvalidInputKind::InvalidTransactionType)]
    #[case::blank_type(Some(dec!(1)), Some("USD"), Some(""), InvalidInputKind::InvalidTransactionType)]
    #[case::unknown_type(Some(dec!(1)), Some("USD"), Some("CHARGEBACK"), InvalidInputKind::InvalidTransactionType)]
    #[case::amount_checked_first(Some(dec!(-1)), Some("XXX"), Some("BOGUS"), InvalidInputKind::InvalidAmount)]
    fn test_invalid_requests(
        #[case] amount: Option<Decimal>,
        #[case] currency: Option<&str>,
        #[case] tx_type: Option<&str>,
        #[case] expected: InvalidInputKind,
    ) {
        assert_eq!(validate(&request(amount, currency, tx_type)), Err(expected));
    }

    #[rstest]
    #[case::absent(None, true)]
    #[case::empty(Some(String::new()), true)]
    #[case::at_limit(Some("a".repeat(500)), true)]
    #[case::over_limit(Some("a".repeat(501)), false)]
    #[case::multibyte_at_limit(Some("é".repeat(500)), true)]
    fn test_description_length(#[case] description: Option<String>, #[case] valid: bool) {
        let mut req = request(Some(dec!(5)), Some("EUR"), Some("PAYMENT"));
        req.description = description;
        assert_eq!(validate(&req).is_ok(), valid);
    }
}
