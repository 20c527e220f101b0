//! Value objects for the Confirmation Queue.
//!
//! Every string field of a confirmation block is length bounded. The
//! newtypes below can only be built through `parse`, which enforces the
//! bound and rejects blank values. `Deserialize` is transparent: it is used
//! to decode queue contents this crate wrote itself, never untrusted input.

use super::errors::{StructuralReason, ValidationError};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Length of a hex-encoded verify key (account numbers, block identifiers).
pub const VERIFY_KEY_LENGTH: usize = 64;

/// Length of a hex-encoded balance lock.
pub const BALANCE_LOCK_LENGTH: usize = 64;

/// Length of a hex-encoded block signature.
pub const SIGNATURE_LENGTH: usize = 128;

/// Maximum length of a transaction memo.
pub const MEMO_MAX_LENGTH: usize = 64;

/// Maximum number of significant digits in a balance.
pub const BALANCE_MAX_DIGITS: u64 = 32;

/// Maximum number of fractional digits in a balance.
pub const BALANCE_DECIMAL_PLACES: u64 = 16;

/// Significant digits an `f64` decoded balance keeps exactly.
pub const NUMBER_MAX_SIGNIFICANT_DIGITS: usize = 15;

fn check_text(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::structural(field, StructuralReason::Blank));
    }

    let actual = value.chars().count();
    if actual > max {
        return Err(ValidationError::structural(
            field,
            StructuralReason::TooLong { max, actual },
        ));
    }

    Ok(())
}

macro_rules! bounded_text {
    ($(#[$meta:meta])* $name:ident, $max:expr) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Maximum length in characters.
            pub const MAX_LENGTH: usize = $max;

            /// Parses untrusted input, reporting failures against `field`.
            pub fn parse(field: &str, value: impl Into<String>) -> Result<Self, ValidationError> {
                let value = value.into();
                check_text(field, &value, Self::MAX_LENGTH)?;
                Ok(Self(value))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

bounded_text!(
    /// Public key identifying an account.
    AccountNumber,
    VERIFY_KEY_LENGTH
);

bounded_text!(
    /// Identifier of a ledger block; the dedup key of the queue.
    BlockIdentifier,
    VERIFY_KEY_LENGTH
);

bounded_text!(
    /// One-time token authorizing a debit of the sender account.
    BalanceLock,
    BALANCE_LOCK_LENGTH
);

bounded_text!(
    /// Balance key the sender signed the block message against.
    BalanceKey,
    BALANCE_LOCK_LENGTH
);

bounded_text!(
    /// Signature over the block message.
    Signature,
    SIGNATURE_LENGTH
);

bounded_text!(
    /// Free-form transaction memo.
    Memo,
    MEMO_MAX_LENGTH
);

impl BlockIdentifier {
    /// Wraps a SHA3-256 hex digest, which always fits the bound.
    pub(crate) fn from_digest(digest: [u8; 32]) -> Self {
        Self(hex::encode(digest))
    }
}

/// Account balance with up to 32 significant digits, 16 of them fractional.
///
/// The accepted text is kept verbatim so the stored queue carries exactly
/// what the peer sent.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Balance {
    text: String,
}

impl Balance {
    /// Parses and checks precision the way a fixed `DECIMAL(32, 16)` column would.
    pub fn parse(field: &str, text: &str) -> Result<Self, ValidationError> {
        let text = text.trim();
        let value = BigDecimal::from_str(text)
            .map_err(|_| ValidationError::structural(field, StructuralReason::InvalidDecimal))?;

        let (digits, scale) = value.as_bigint_and_exponent();
        let digit_count = digits.to_string().trim_start_matches('-').len() as u64;

        // `scale` is the number of fractional digits; negative means trailing zeros.
        let (total, decimals) = if scale <= 0 {
            (digit_count + scale.unsigned_abs(), 0)
        } else if digit_count > scale as u64 {
            (digit_count, scale as u64)
        } else {
            (scale as u64, scale as u64)
        };
        let whole = total - decimals;

        if total > BALANCE_MAX_DIGITS {
            return Err(ValidationError::structural(
                field,
                StructuralReason::TooManyDigits {
                    max: BALANCE_MAX_DIGITS,
                },
            ));
        }
        if decimals > BALANCE_DECIMAL_PLACES {
            return Err(ValidationError::structural(
                field,
                StructuralReason::TooManyDecimalPlaces {
                    max: BALANCE_DECIMAL_PLACES,
                },
            ));
        }
        if whole > BALANCE_MAX_DIGITS - BALANCE_DECIMAL_PLACES {
            return Err(ValidationError::structural(
                field,
                StructuralReason::TooManyWholeDigits {
                    max: BALANCE_MAX_DIGITS - BALANCE_DECIMAL_PLACES,
                },
            ));
        }

        Ok(Self {
            text: text.to_string(),
        })
    }

    /// Parses a balance as it arrived on the wire.
    ///
    /// JSON numbers with a fraction or exponent were already decoded to an
    /// `f64`, which only round-trips 15 significant digits. Longer ones are
    /// rejected instead of being accepted at a rounded value.
    pub fn from_input(field: &str, input: &DecimalInput) -> Result<Self, ValidationError> {
        if let DecimalInput::Number(number) = input {
            let digits = significant_digits(&number.to_string());
            if number.is_f64() && digits > NUMBER_MAX_SIGNIFICANT_DIGITS {
                return Err(ValidationError::structural(
                    field,
                    StructuralReason::ImpreciseNumber {
                        max: NUMBER_MAX_SIGNIFICANT_DIGITS,
                    },
                ));
            }
        }
        Self::parse(field, &input.to_text())
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for Balance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for Balance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Balance {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Balance::parse("balance", &text).map_err(serde::de::Error::custom)
    }
}

fn significant_digits(number: &str) -> usize {
    let mantissa = number.split(['e', 'E']).next().unwrap_or("");
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    digits.trim_start_matches('0').trim_end_matches('0').len()
}

/// A balance as it arrives on the wire: JSON string or JSON number.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DecimalInput {
    Text(String),
    Number(serde_json::Number),
}

impl DecimalInput {
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => number.to_string(),
        }
    }
}

/// Message asking the head advancement worker to walk the queue from
/// `head_block_hash`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadAdvancementRequest {
    pub correlation_id: Uuid,
    pub head_block_hash: BlockIdentifier,
}

impl HeadAdvancementRequest {
    pub fn new(head_block_hash: BlockIdentifier) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            head_block_hash,
        }
    }
}

/// Result of one head advancement run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdvanceReport {
    /// Blocks committed and removed from the queue.
    pub committed: Vec<BlockIdentifier>,
    /// Head after the run, if one is set.
    pub head_block_hash: Option<BlockIdentifier>,
}

impl AdvanceReport {
    pub fn is_noop(&self) -> bool {
        self.committed.is_empty()
    }
}

/// Whether a submission scheduled head advancement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerDecision {
    /// The block matched the head and a request was queued for the worker.
    Scheduled { correlation_id: Uuid },
    /// The block does not match the current head.
    NoTrigger,
    /// The block matched the head but the request could not be queued.
    ScheduleFailed,
}

impl TriggerDecision {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, Self::Scheduled { .. })
    }
}

/// Outcome of an accepted submission.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitOutcome {
    pub block_identifier: BlockIdentifier,
    /// Number of blocks resident right after the enqueue.
    pub queue_depth: usize,
    pub trigger: TriggerDecision,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reason(err: ValidationError) -> StructuralReason {
        match err {
            ValidationError::Structural { reason, .. } => reason,
            other => panic!("expected structural error, got {other:?}"),
        }
    }

    #[test]
    fn test_bounded_text_accepts_max_length() {
        let value = "a".repeat(VERIFY_KEY_LENGTH);
        let account = AccountNumber::parse("account_number", value.clone()).unwrap();
        assert_eq!(account.as_str(), value);
    }

    #[test]
    fn test_bounded_text_rejects_overlong() {
        let err = BlockIdentifier::parse("block_identifier", "f".repeat(65)).unwrap_err();
        assert_eq!(err.field(), Some("block_identifier"));
        assert_eq!(reason(err), StructuralReason::TooLong { max: 64, actual: 65 });
    }

    #[test]
    fn test_bounded_text_rejects_blank() {
        let err = BalanceLock::parse("balance_lock", "   ").unwrap_err();
        assert_eq!(reason(err), StructuralReason::Blank);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 64 two-byte characters
        assert!(Memo::parse("memo", "é".repeat(64)).is_ok());
    }

    #[test]
    fn test_balance_precision_limits() {
        assert!(Balance::parse("balance", "1234567890123456.1234567890123456").is_ok());
        assert!(Balance::parse("balance", "-5.5").is_ok());
        assert!(Balance::parse("balance", "0.0000000000000000").is_ok());

        let err = Balance::parse("balance", "1.12345678901234567").unwrap_err();
        assert_eq!(
            reason(err),
            StructuralReason::TooManyDecimalPlaces { max: 16 }
        );

        let err = Balance::parse("balance", "12345678901234567").unwrap_err();
        assert_eq!(reason(err), StructuralReason::TooManyWholeDigits { max: 16 });

        let err = Balance::parse("balance", "12345678901234567.1234567890123456").unwrap_err();
        assert_eq!(reason(err), StructuralReason::TooManyDigits { max: 32 });
    }

    #[test]
    fn test_balance_rejects_non_numeric() {
        for text in ["", "abc", "NaN", "1.2.3"] {
            let err = Balance::parse("balance", text).unwrap_err();
            assert_eq!(reason(err), StructuralReason::InvalidDecimal, "{text}");
        }
    }

    #[test]
    fn test_balance_exponent_counts_whole_digits() {
        assert!(Balance::parse("balance", "1E15").is_ok());
        let err = Balance::parse("balance", "1E16").unwrap_err();
        assert_eq!(reason(err), StructuralReason::TooManyWholeDigits { max: 16 });
    }

    #[test]
    fn test_balance_serializes_verbatim() {
        let balance = Balance::parse("balance", " 10.50 ").unwrap();
        let json = serde_json::to_string(&balance).unwrap();
        assert_eq!(json, "\"10.50\"");

        let decoded: Balance = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, balance);
    }

    #[test]
    fn test_decimal_input_accepts_number_and_text() {
        let number: DecimalInput = serde_json::from_str("42.5").unwrap();
        let text: DecimalInput = serde_json::from_str("\"42.5\"").unwrap();
        assert_eq!(number.to_text(), "42.5");
        assert_eq!(text.to_text(), "42.5");
    }

    #[test]
    fn test_long_numeric_balance_rejected_not_rounded() {
        let input: DecimalInput =
            serde_json::from_str("1234567890123456.1234567890123456").unwrap();
        let err = Balance::from_input("balance", &input).unwrap_err();
        assert_eq!(reason(err), StructuralReason::ImpreciseNumber { max: 15 });

        // The same value as text keeps every digit.
        let input: DecimalInput =
            serde_json::from_str("\"1234567890123456.1234567890123456\"").unwrap();
        let balance = Balance::from_input("balance", &input).unwrap();
        assert_eq!(balance.as_str(), "1234567890123456.1234567890123456");
    }

    #[test]
    fn test_short_and_integer_numeric_balances_accepted() {
        let input: DecimalInput = serde_json::from_str("0.1").unwrap();
        assert_eq!(Balance::from_input("balance", &input).unwrap().as_str(), "0.1");

        let input: DecimalInput = serde_json::from_str("9007199254740993").unwrap();
        assert_eq!(
            Balance::from_input("balance", &input).unwrap().as_str(),
            "9007199254740993"
        );
    }
}
