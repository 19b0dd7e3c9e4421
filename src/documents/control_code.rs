//! Fiscal control code printed on invoices.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};

use super::common::format_amount;

/// Number of hex characters kept from the digest.
const CONTROL_CODE_LEN: usize = 16;

/// SHA-256 over `number + tax_id + amount(2dp) + issued_at(epoch millis)`, first 16 hex
/// characters, upper-cased.
pub fn control_code(
    document_number: &str,
    issuer_tax_id: &str,
    amount: Decimal,
    issued_at: DateTime<Utc>,
) -> String {
    let material = format!(
        "{}{}{}{}",
        document_number,
        issuer_tax_id,
        format_amount(amount),
        issued_at.timestamp_millis()
    );
    let digest = Sha256::digest(material.as_bytes());
    hex::encode(digest)[..CONTROL_CODE_LEN].to_uppercase()
}

/// Re-derives the code for a stored invoice whose issue time is known.
pub fn verify_control_code(
    code: &str,
    document_number: &str,
    issuer_tax_id: &str,
    amount: Decimal,
    issued_at: DateTime<Utc>,
) -> bool {
    control_code(document_number, issuer_tax_id, amount, issued_at).eq_ignore_ascii_case(code.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(millis: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(millis).unwrap()
    }

    #[test]
    fn test_shape_is_sixteen_upper_hex() {
        let code = control_code("NOM-00000042", "1234567890123", Decimal::new(1500, 0), at(1_700_000_000_000));
        assert_eq!(code.len(), 16);
        assert!(code.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn test_matches_digest_of_concatenation() {
        let expected = hex::encode(Sha256::digest(b"NOM-000000421234567890123150.001700000000000"));
        let code = control_code("NOM-00000042", "1234567890123", Decimal::new(150, 0), at(1_700_000_000_000));
        assert_eq!(code, expected[..16].to_uppercase());
    }

    #[test]
    fn test_time_changes_the_code() {
        let amount = Decimal::new(1500, 0);
        let first = control_code("NOM-00000042", "1234567890123", amount, at(1_700_000_000_000));
        let second = control_code("NOM-00000042", "1234567890123", amount, at(1_700_000_000_001));
        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_round_trip() {
        let amount = Decimal::new(99999, 2);
        let issued = at(1_712_345_678_901);
        let code = control_code("NOM-00000007", "1234567890123", amount, issued);
        assert!(verify_control_code(&code.to_lowercase(), "NOM-00000007", "1234567890123", amount, issued));
        assert!(!verify_control_code(&code, "NOM-00000008", "1234567890123", amount, issued));
    }
}
