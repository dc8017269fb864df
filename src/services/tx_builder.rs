use std::str::FromStr;

use ethers::abi::{self, Token};
use ethers::types::{Address, Bytes, U256};

use crate::{
    error::{AppError, Result},
    models::{TransferStrategy, UnsignedTransactionRequest},
};

/// Convert a human decimal amount into base units, exactly.
///
/// The math runs over the decimal string itself. "0.00000001" at 18
/// decimals scales to 10_000_000_000 with no rounding; a float multiply
/// would not survive that.
pub fn scale_units(amount_text: &str, decimals: u32) -> Result<U256> {
    let text = amount_text.trim();
    if text.is_empty() {
        return Err(AppError::AmountParse("amount is empty".to_string()));
    }

    let (int_part, frac_part) = match text.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => (text, ""),
    };

    if int_part.is_empty() && frac_part.is_empty() {
        return Err(AppError::AmountParse(format!(
            "'{}' is not a decimal number",
            text
        )));
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(AppError::AmountParse(format!(
            "'{}' is not a non-negative decimal number",
            text
        )));
    }
    if frac_part.len() as u32 > decimals {
        return Err(AppError::AmountParse(format!(
            "'{}' has more than {} decimal places",
            text, decimals
        )));
    }

    let mut digits = String::with_capacity(int_part.len() + decimals as usize);
    digits.push_str(int_part);
    digits.push_str(frac_part);
    for _ in frac_part.len() as u32..decimals {
        digits.push('0');
    }

    U256::from_dec_str(&digits).map_err(|e| {
        AppError::AmountParse(format!("'{}' does not fit in 256 bits: {:?}", text, e))
    })
}

/// Inverse of `scale_units`, up to trailing-zero normalization.
pub fn unscale_units(value: U256, decimals: u32) -> String {
    let raw = value.to_string();
    if decimals == 0 {
        return raw;
    }
    let decimals = decimals as usize;
    let padded = if raw.len() <= decimals {
        format!("{}{}", "0".repeat(decimals + 1 - raw.len()), raw)
    } else {
        raw
    };
    let (int_part, frac_part) = padded.split_at(padded.len() - decimals);
    let frac_part = frac_part.trim_end_matches('0');
    if frac_part.is_empty() {
        int_part.to_string()
    } else {
        format!("{}.{}", int_part, frac_part)
    }
}

/// ABI-encode `transfer(recipient, amount)` for an ERC-20 contract call.
pub fn encode_transfer_call(selector: [u8; 4], recipient: Address, amount: U256) -> Bytes {
    let mut payload = Vec::with_capacity(4 + 64);
    payload.extend_from_slice(&selector);
    payload.extend_from_slice(&abi::encode(&[
        Token::Address(recipient),
        Token::Uint(amount),
    ]));
    Bytes::from(payload)
}

/// Build a chain-ready request from a classified strategy.
///
/// The recipient is not checksum-validated here; the wallet layer owns
/// address rejection. The token path still decodes it because the calldata
/// cannot be encoded without the raw bytes.
pub fn build(
    strategy: &TransferStrategy,
    recipient: &str,
    amount_text: &str,
) -> Result<UnsignedTransactionRequest> {
    match strategy {
        TransferStrategy::Native { decimals } => {
            let value = scale_units(amount_text, *decimals)?;
            tracing::debug!(
                "Native transfer of {} base units (= {})",
                value,
                unscale_units(value, *decimals)
            );
            Ok(UnsignedTransactionRequest {
                to: recipient.to_string(),
                value,
                data: None,
            })
        }
        TransferStrategy::Token {
            contract,
            decimals,
            selector,
        } => {
            let scaled = scale_units(amount_text, *decimals)?;
            let recipient_addr = Address::from_str(recipient.trim()).map_err(|e| {
                AppError::Submission(format!("Invalid recipient address '{}': {}", recipient, e))
            })?;
            let data = encode_transfer_call(*selector, recipient_addr, scaled);
            tracing::debug!("Token transfer calldata: 0x{}", hex::encode(&data));
            Ok(UnsignedTransactionRequest {
                to: format!("{:?}", contract),
                value: U256::zero(),
                data: Some(data),
            })
        }
        TransferStrategy::Unsupported { label } => Err(AppError::UnsupportedAsset(label.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::ERC20_TRANSFER_SELECTOR;

    const RECIPIENT: &str = "0xabcdabcdabcdabcdabcdabcdabcdabcdabcd1234";

    fn native() -> TransferStrategy {
        TransferStrategy::Native { decimals: 18 }
    }

    fn token(decimals: u32) -> TransferStrategy {
        TransferStrategy::Token {
            contract: Address::from_str("0x1111111111111111111111111111111111111111").unwrap(),
            decimals,
            selector: ERC20_TRANSFER_SELECTOR,
        }
    }

    #[test]
    fn scale_tenth_of_an_ether() {
        let value = scale_units("0.1", 18).unwrap();
        assert_eq!(value, U256::from_dec_str("100000000000000000").unwrap());
    }

    #[test]
    fn scale_preserves_tiny_amounts() {
        // The float path the builder replaces truncated these to zero
        let value = scale_units("0.00000001", 18).unwrap();
        assert_eq!(value, U256::from_dec_str("10000000000").unwrap());
        assert!(!value.is_zero());
    }

    #[test]
    fn scale_accepts_integer_and_fraction_shapes() {
        assert_eq!(
            scale_units("5", 18).unwrap(),
            U256::exp10(18) * U256::from(5u64)
        );
        assert_eq!(scale_units(".5", 1).unwrap(), U256::from(5u64));
        assert_eq!(scale_units("5.", 0).unwrap(), U256::from(5u64));
        assert_eq!(scale_units("0", 18).unwrap(), U256::zero());
    }

    #[test]
    fn scale_rejects_invalid_numerals() {
        for bad in ["", ".", "-1", "+1", "1.2.3", "1e5", "abc", "1,5"] {
            assert!(
                scale_units(bad, 18).is_err(),
                "{:?} should not parse",
                bad
            );
        }
    }

    #[test]
    fn scale_rejects_excess_precision() {
        let err = scale_units("0.1234567", 6).unwrap_err();
        assert!(err.to_string().contains("decimal places"));
    }

    #[test]
    fn scale_unscale_round_trips() {
        for (amount, decimals) in [
            ("0.1", 18u32),
            ("0.00000001", 18),
            ("5", 18),
            ("123.456", 6),
            ("1000000", 0),
        ] {
            let scaled = scale_units(amount, decimals).unwrap();
            let recovered = unscale_units(scaled, decimals);
            // Equal up to trailing-zero normalization
            assert_eq!(
                scale_units(&recovered, decimals).unwrap(),
                scaled,
                "{} @ {} decimals",
                amount,
                decimals
            );
        }
    }

    #[test]
    fn unscale_normalizes_trailing_zeros() {
        assert_eq!(unscale_units(U256::exp10(18), 18), "1");
        assert_eq!(
            unscale_units(U256::from_dec_str("100000000000000000").unwrap(), 18),
            "0.1"
        );
        assert_eq!(unscale_units(U256::zero(), 18), "0");
    }

    #[test]
    fn build_native_sets_value_and_passes_recipient_verbatim() {
        let request = build(&native(), "0xABCD...1234", "0.1").unwrap();
        assert_eq!(request.to, "0xABCD...1234");
        assert_eq!(
            request.value,
            U256::from_dec_str("100000000000000000").unwrap()
        );
        assert!(request.data.is_none());
    }

    #[test]
    fn build_token_encodes_transfer_with_zero_value() {
        let request = build(&token(18), RECIPIENT, "5").unwrap();
        assert_eq!(request.value, U256::zero());
        assert_eq!(request.to, "0x1111111111111111111111111111111111111111");

        let data = request.data.expect("token transfer carries calldata");
        assert_eq!(data.len(), 4 + 32 + 32);
        assert_eq!(&data[..4], &ERC20_TRANSFER_SELECTOR[..]);

        // Word 1: left-padded recipient
        let recipient_addr = Address::from_str(RECIPIENT).unwrap();
        assert_eq!(&data[4..16], &[0u8; 12][..]);
        assert_eq!(&data[16..36], recipient_addr.as_bytes());

        // Word 2: 5 * 10^18
        let amount = U256::from_big_endian(&data[36..68]);
        assert_eq!(amount, U256::exp10(18) * U256::from(5u64));
    }

    #[test]
    fn build_token_rejects_undecodable_recipient() {
        let err = build(&token(18), "0xnot-an-address", "5").unwrap_err();
        assert!(matches!(err, AppError::Submission(_)));
    }

    #[test]
    fn build_unsupported_short_circuits() {
        let err = build(
            &TransferStrategy::Unsupported {
                label: "BTC".to_string(),
            },
            RECIPIENT,
            "1",
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported token: BTC");
    }
}
