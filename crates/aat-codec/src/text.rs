//! ASCII text conventions of INFO items: strict integer parsing, numeric
//! rendering, right justification, and byte-preserving character data.

use aat_core::FormatError;

/// Parse an integer (`I`) item.
///
/// Accepted bytes are spaces, digits, and a minus sign as the first
/// non-space byte. A blank item is zero.
pub fn parse_bcd(field: &str, bytes: &[u8]) -> Result<i64, FormatError> {
    let mut value: i64 = 0;
    let mut negative = false;
    let mut seen_non_space = false;

    for (offset, &byte) in bytes.iter().enumerate() {
        match byte {
            b' ' => continue,
            b'-' if !seen_non_space => negative = true,
            b'0'..=b'9' => {
                value = value
                    .checked_mul(10)
                    .and_then(|v| v.checked_add(i64::from(byte - b'0')))
                    .ok_or_else(|| FormatError::BcdOverflow {
                        field: field.to_string(),
                        text: latin1_decode(bytes),
                    })?;
            }
            _ => {
                return Err(FormatError::InvalidBcd {
                    field: field.to_string(),
                    byte,
                    offset,
                })
            }
        }
        seen_non_space = true;
    }

    Ok(if negative { -value } else { value })
}

/// Parse a numeric (`N`) item as decimal text, ignoring surrounding spaces.
pub fn parse_numeric(field: &str, bytes: &[u8]) -> Result<f64, FormatError> {
    let text = latin1_decode(bytes);
    text.trim()
        .parse::<f64>()
        .map_err(|_| FormatError::InvalidNumeric {
            field: field.to_string(),
            text,
        })
}

/// Render a floating value the way numeric items have always been written:
/// plain decimal with at least one fractional digit in `[1e-3, 1e7)`,
/// `d.dddE±n` outside it.
pub fn render_numeric(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }

    let magnitude = value.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        let text = value.to_string();
        if text.contains('.') {
            text
        } else {
            format!("{text}.0")
        }
    } else {
        let text = format!("{value:E}");
        match text.split_once('E') {
            Some((mantissa, exp)) if !mantissa.contains('.') => format!("{mantissa}.0E{exp}"),
            _ => text,
        }
    }
}

/// Right-justify `text` in `width` bytes with space fill.
///
/// Text longer than `width` keeps only its first `width` bytes; the second
/// element of the result reports that the value was cut.
pub fn right_justify(text: &str, width: usize) -> (Vec<u8>, bool) {
    let bytes = text.as_bytes();
    if bytes.len() > width {
        return (bytes[..width].to_vec(), true);
    }
    let mut out = vec![b' '; width - bytes.len()];
    out.extend_from_slice(bytes);
    (out, false)
}

/// Character items are single-byte text; map every byte to the code point
/// of the same value so that any content survives a round trip.
pub fn latin1_decode(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Inverse of [`latin1_decode`], space-padded or cut to `width`.
///
/// Characters above U+00FF cannot be stored and become `?`.
pub fn latin1_encode(text: &str, width: usize) -> Vec<u8> {
    let mut out: Vec<u8> = text
        .chars()
        .take(width)
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect();
    out.resize(width, b' ');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bcd_accepts_padding_and_sign() {
        assert_eq!(parse_bcd("F", b"   42").unwrap(), 42);
        assert_eq!(parse_bcd("F", b"  -17").unwrap(), -17);
        assert_eq!(parse_bcd("F", b"-   5").unwrap(), -5);
        assert_eq!(parse_bcd("F", b"     ").unwrap(), 0);
        assert_eq!(parse_bcd("F", b"0").unwrap(), 0);
    }

    #[test]
    fn bcd_rejects_stray_bytes() {
        let err = parse_bcd("LOCAL", b" 1x2").unwrap_err();
        assert!(matches!(
            err,
            FormatError::InvalidBcd {
                byte: b'x',
                offset: 2,
                ..
            }
        ));

        // Minus after a digit.
        assert!(matches!(
            parse_bcd("LOCAL", b"12-3"),
            Err(FormatError::InvalidBcd { offset: 2, .. })
        ));

        // Second minus.
        assert!(matches!(
            parse_bcd("LOCAL", b"--3"),
            Err(FormatError::InvalidBcd { offset: 1, .. })
        ));

        assert!(matches!(
            parse_bcd("LOCAL", b"+3"),
            Err(FormatError::InvalidBcd { byte: b'+', .. })
        ));

        // NUL fill is not blank.
        assert!(parse_bcd("LOCAL", &[0, 0, b'1']).is_err());
    }

    #[test]
    fn bcd_overflow_is_an_error() {
        let err = parse_bcd("BIG", b"99999999999999999999").unwrap_err();
        assert!(matches!(err, FormatError::BcdOverflow { .. }));
    }

    #[test]
    fn numeric_parse() {
        assert_eq!(parse_numeric("N", b"  22500.0").unwrap(), 22500.0);
        assert_eq!(parse_numeric("N", b"   -1.5E7").unwrap(), -1.5e7);
        assert!(matches!(
            parse_numeric("N", b" 1.2.3"),
            Err(FormatError::InvalidNumeric { .. })
        ));
        assert!(parse_numeric("N", b"     ").is_err());
    }

    #[test]
    fn numeric_rendering() {
        assert_eq!(render_numeric(22500.0), "22500.0");
        assert_eq!(render_numeric(0.0), "0.0");
        assert_eq!(render_numeric(-2.25), "-2.25");
        assert_eq!(render_numeric(0.001), "0.001");
        assert_eq!(render_numeric(1.0e7), "1.0E7");
        assert_eq!(render_numeric(1.5e7), "1.5E7");
        assert_eq!(render_numeric(1.0e-4), "1.0E-4");
        assert_eq!(render_numeric(f64::NEG_INFINITY), "-Infinity");
    }

    #[test]
    fn rendering_parses_back() {
        for v in [0.0, 1.0, -3.75, 123456.789, 2.5e9, -4.0e-6] {
            let text = render_numeric(v);
            assert_eq!(parse_numeric("N", text.as_bytes()).unwrap(), v, "{text}");
        }
    }

    #[test]
    fn justification() {
        assert_eq!(right_justify("42", 5), (b"   42".to_vec(), false));
        assert_eq!(right_justify("12345", 5), (b"12345".to_vec(), false));
        assert_eq!(right_justify("1234567", 5), (b"12345".to_vec(), true));
    }

    #[test]
    fn latin1_round_trip() {
        let raw: Vec<u8> = vec![b'A', 0xE9, b' ', 0x00, 0xFF];
        let text = latin1_decode(&raw);
        assert_eq!(latin1_encode(&text, raw.len()), raw);
        assert_eq!(latin1_encode("AB", 4), b"AB  ".to_vec());
        assert_eq!(latin1_encode("ABCDEF", 3), b"ABC".to_vec());
        assert_eq!(latin1_encode("\u{4e2d}", 1), b"?".to_vec());
    }
}
