//! `char`/`string` decode: MATLAB stores character data as UTF-16LE code
//! units, one per element. Malformed sequences are recovered lossily with
//! replacement characters rather than failing the enclosing call.

/// Decodes a flat buffer of UTF-16 code units (as read off an unsigned
/// 16-bit-kind dataset) into a native `String`, stripping a single trailing
/// NUL if present.
pub fn decode_utf16_units(units: &[u16]) -> String {
    let units = match units.split_last() {
        Some((0, rest)) => rest,
        _ => units,
    };
    char::decode_utf16(units.iter().copied())
        .map(|r| r.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect()
}

/// Decodes a raw byte buffer as UTF-16LE (the codepath for `char`/`string`
/// datasets whose HDF5 element type is not itself an unsigned 16-bit kind,
/// e.g. a byte-oriented encoding of the same data).
pub fn decode_utf16le_bytes(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    decode_utf16_units(&units)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_plain_ascii() {
        let units: Vec<u16> = "hello".encode_utf16().collect();
        assert_eq!(decode_utf16_units(&units), "hello");
    }

    #[test]
    fn strips_trailing_nul() {
        let mut units: Vec<u16> = "hi".encode_utf16().collect();
        units.push(0);
        assert_eq!(decode_utf16_units(&units), "hi");
    }

    #[test]
    fn recovers_lossily_from_unpaired_surrogate() {
        let mut units: Vec<u16> = "ok".encode_utf16().collect();
        units.push(0xD800); // unpaired high surrogate
        let decoded = decode_utf16_units(&units);
        assert!(decoded.starts_with("ok"));
        assert!(decoded.contains(char::REPLACEMENT_CHARACTER));
    }

    #[test]
    fn decodes_from_le_bytes() {
        let bytes: Vec<u8> = "hey".encode_utf16().flat_map(u16::to_le_bytes).collect();
        assert_eq!(decode_utf16le_bytes(&bytes), "hey");
    }
}
