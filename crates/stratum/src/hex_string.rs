/// Returns true if `s` has an even number of characters and every pair of
/// characters is a hexadecimal byte. Case is ignored.
///
/// Every miner-supplied hex field goes through this before it is decoded.
pub fn is_hex_string(s: &str) -> bool {
    s.len() % 2 == 0
        && s.as_bytes()
            .chunks_exact(2)
            .all(|pair| pair.iter().all(u8::is_ascii_hexdigit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_even_length_hex() {
        assert!(is_hex_string("ab12"));
        assert!(is_hex_string("AB12"));
        assert!(is_hex_string("00"));
        assert!(is_hex_string("deadBEEF"));
    }

    #[test]
    fn rejects_odd_length() {
        assert!(!is_hex_string("abc"));
        assert!(!is_hex_string("0"));
    }

    #[test]
    fn rejects_non_hex_characters() {
        assert!(!is_hex_string("zz"));
        assert!(!is_hex_string("0x"));
        assert!(!is_hex_string("ab 1"));
        assert!(!is_hex_string("+1"));
        assert!(!is_hex_string("éa"));
    }

    #[test]
    fn empty_string_is_even_length() {
        assert!(is_hex_string(""));
    }

    #[test]
    fn every_byte_value_round_trips() {
        for byte in 0..=u8::MAX {
            assert!(is_hex_string(&format!("{byte:02x}")));
            assert!(is_hex_string(&format!("{byte:02X}")));
        }
    }
}
