//! Hex codec for the serial trace wire format
//!
//! The firmware prints each buffer as a run of hex digits followed by a line
//! terminator. Captures come from different hosts, so both `\n` and `\r\n`
//! are accepted, as are both letter cases.

use contracts::ZONE_COUNT;

use crate::error::HexError;

/// Remove exactly one trailing line terminator (`\r\n` or `\n`)
pub fn strip_terminator(text: &str) -> &str {
    text.strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text)
}

/// Decode hex text into `out`, which fixes the expected byte count
///
/// The length is checked before any digit, so a short line reports
/// [`HexError::MalformedLength`] even if it also contains bad digits.
pub fn decode_into(text: &str, out: &mut [u8]) -> Result<(), HexError> {
    let digits = strip_terminator(text);
    let expected = out.len() * 2;

    // Lengths and positions are in characters, not UTF-8 bytes
    let actual = digits.chars().count();
    if actual != expected {
        return Err(HexError::MalformedLength { expected, actual });
    }

    if let Some((index, character)) = digits.chars().enumerate().find(|(_, c)| !c.is_ascii()) {
        return Err(HexError::MalformedDigit { index, character });
    }

    hex::decode_to_slice(digits, out).map_err(|e| match e {
        hex::FromHexError::InvalidHexCharacter { c, index } => HexError::MalformedDigit {
            index,
            character: c,
        },
        hex::FromHexError::OddLength | hex::FromHexError::InvalidStringLength => {
            HexError::MalformedLength { expected, actual }
        }
    })
}

/// Decode hex text into exactly `expected_len` bytes
pub fn decode(text: &str, expected_len: usize) -> Result<Vec<u8>, HexError> {
    let mut bytes = vec![0u8; expected_len];
    decode_into(text, &mut bytes)?;
    Ok(bytes)
}

/// Decode one zone buffer
pub fn decode_frame(text: &str) -> Result<[u8; ZONE_COUNT], HexError> {
    let mut buffer = [0u8; ZONE_COUNT];
    decode_into(text, &mut buffer)?;
    Ok(buffer)
}

/// Encode bytes as uppercase hex, no separators, no terminator
pub fn encode(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_text() -> String {
        (0..ZONE_COUNT as u8)
            .map(|b| format!("{:02x}", b.wrapping_mul(37)))
            .collect()
    }

    #[test]
    fn test_decode_then_encode_uppercases() {
        let text = sample_text();
        for terminated in [text.clone(), format!("{text}\n"), format!("{text}\r\n")] {
            let bytes = decode_frame(&terminated).unwrap();
            assert_eq!(encode(&bytes), text.to_uppercase());
        }
    }

    #[test]
    fn test_decode_byte_order_and_nibbles() {
        let bytes = decode("0aFf10\n", 3).unwrap();
        assert_eq!(bytes, vec![0x0A, 0xFF, 0x10]);
    }

    #[test]
    fn test_strips_only_one_terminator() {
        assert_eq!(strip_terminator("AB\r\n"), "AB");
        assert_eq!(strip_terminator("AB\n"), "AB");
        assert_eq!(strip_terminator("AB\n\n"), "AB\n");
        assert_eq!(strip_terminator("AB"), "AB");

        let err = decode("AB\n\n", 1).unwrap_err();
        assert!(matches!(err, HexError::MalformedLength { expected: 2, .. }));
    }

    #[test]
    fn test_wrong_length() {
        let text = sample_text();
        let short = &text[..127];
        assert_eq!(
            decode_frame(short).unwrap_err(),
            HexError::MalformedLength {
                expected: 128,
                actual: 127
            }
        );

        let long = format!("{text}00\n");
        assert!(matches!(
            decode_frame(&long),
            Err(HexError::MalformedLength { actual: 130, .. })
        ));

        // Trailing space is not a terminator
        let spaced = format!("{text} ");
        assert!(matches!(
            decode_frame(&spaced),
            Err(HexError::MalformedLength { .. })
        ));
    }

    #[test]
    fn test_bad_digit() {
        let mut text = sample_text();
        text.replace_range(10..11, "g");
        assert_eq!(
            decode_frame(&text).unwrap_err(),
            HexError::MalformedDigit {
                index: 10,
                character: 'g'
            }
        );
    }

    #[test]
    fn test_bad_digit_at_every_position() {
        let text = sample_text();
        for index in [0, 1, 63, 126, 127] {
            let mut broken = text.clone();
            broken.replace_range(index..index + 1, "z");
            let err = decode_frame(&format!("{broken}\r\n")).unwrap_err();
            assert_eq!(
                err,
                HexError::MalformedDigit {
                    index,
                    character: 'z'
                }
            );
        }
    }

    #[test]
    fn test_multibyte_char_is_a_digit_error() {
        let mut text = "0".repeat(127);
        text.insert(10, 'é');
        assert_eq!(
            decode_frame(&text).unwrap_err(),
            HexError::MalformedDigit {
                index: 10,
                character: 'é'
            }
        );

        // 127 characters but 128 bytes
        let mut short = "0".repeat(126);
        short.insert(10, 'é');
        assert_eq!(
            decode_frame(&short).unwrap_err(),
            HexError::MalformedLength {
                expected: 128,
                actual: 127
            }
        );
    }

    #[test]
    fn test_encode_empty() {
        assert_eq!(encode(&[]), "");
        assert_eq!(encode(&[0x00, 0x05, 0xab]), "0005AB");
    }
}
