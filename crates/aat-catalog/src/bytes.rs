//! Big-endian field access for descriptor files.

pub(crate) fn be_i16(bytes: &[u8], offset: usize) -> Option<i16> {
    let raw = bytes.get(offset..offset + 2)?;
    raw.try_into().ok().map(i16::from_be_bytes)
}

pub(crate) fn be_i32(bytes: &[u8], offset: usize) -> Option<i32> {
    let raw = bytes.get(offset..offset + 4)?;
    raw.try_into().ok().map(i32::from_be_bytes)
}

/// Single-byte text with trailing blanks and NULs removed.
pub(crate) fn padded_text(bytes: &[u8]) -> String {
    let text: String = bytes.iter().map(|&b| char::from(b)).collect();
    text.trim_end_matches([' ', '\0']).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_big_endian() {
        let bytes = [0x00, 0x01, 0xFF, 0xFE, 0x00, 0x00];
        assert_eq!(be_i16(&bytes, 0), Some(1));
        assert_eq!(be_i16(&bytes, 2), Some(-2));
        assert_eq!(be_i32(&bytes, 2), Some(-131_072));
        assert_eq!(be_i32(&bytes, 4), None);
    }

    #[test]
    fn trims_padding() {
        assert_eq!(padded_text(b"LOCAL   \0\0"), "LOCAL");
        assert_eq!(padded_text(b"  "), "");
    }
}
