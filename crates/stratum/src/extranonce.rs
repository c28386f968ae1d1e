use super::*;

/// Per-connection extranonce. Its leading bytes fix the high bits of every
/// nonce the connection may submit, which keeps workers out of each other's
/// search space.
#[derive(Clone, Debug, PartialEq, Eq, Hash, DeserializeFromStr, SerializeDisplay)]
pub struct Extranonce(Vec<u8>);

impl Extranonce {
    pub const SIZE: usize = 3;

    /// Number of leading hex characters of a nonce that must match.
    pub const RANGE_PREFIX_LEN: usize = 4;

    pub fn generate() -> Self {
        let mut v = vec![0u8; Self::SIZE];
        rand::rng().fill_bytes(&mut v);
        Self(v)
    }

    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// The hex prefix a nonce must start with to belong to this extranonce.
    pub fn range_prefix(&self) -> String {
        let mut prefix = self.to_hex();
        prefix.truncate(Self::RANGE_PREFIX_LEN);
        prefix
    }

    /// True if `nonce` (hex) starts with this extranonce's range prefix.
    pub fn covers(&self, nonce: &str) -> bool {
        let prefix = self.range_prefix();

        nonce
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(&prefix))
    }
}

impl Display for Extranonce {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Extranonce {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        hex::decode(s)
            .map(Self)
            .map_err(|e| InternalError::Parse {
                message: format!("invalid extranonce hex string '{s}': {e}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[test]
    fn generate_is_three_bytes() {
        let extranonce = Extranonce::generate();
        assert_eq!(extranonce.len(), 3);
        assert_eq!(extranonce.to_hex().len(), 6);
        assert!(is_hex_string(&extranonce.to_hex()));
    }

    #[test]
    fn generate_is_random() {
        let distinct = (0..32)
            .map(|_| Extranonce::generate())
            .collect::<std::collections::HashSet<_>>();
        assert!(distinct.len() > 1);
    }

    #[test]
    fn rejects_odd_length_hex() {
        assert!(
            "abc"
                .parse::<Extranonce>()
                .unwrap_err()
                .to_string()
                .contains("Odd number of digits")
        );
    }

    #[test]
    fn rejects_non_hex() {
        assert!(
            "zz".parse::<Extranonce>()
                .unwrap_err()
                .to_string()
                .contains("Invalid character")
        );
    }

    #[test]
    fn serde_is_hex_string() {
        let extranonce: Extranonce = serde_json::from_str(r#""abcdef""#).unwrap();
        assert_eq!(extranonce.as_bytes(), &[0xab, 0xcd, 0xef]);
        assert_eq!(serde_json::to_string(&extranonce).unwrap(), r#""abcdef""#);
    }

    #[test]
    fn range_prefix_is_first_four_hex_chars() {
        let extranonce: Extranonce = "a1b2c3".parse().unwrap();
        assert_eq!(extranonce.range_prefix(), "a1b2");
    }

    #[test]
    fn covers_matching_nonce() {
        let extranonce: Extranonce = "a1b2c3".parse().unwrap();
        assert!(extranonce.covers("a1b2000000000000"));
        assert!(extranonce.covers("A1B2ffffffffffff"));
        assert!(!extranonce.covers("a1b3000000000000"));
        assert!(!extranonce.covers("00a1b20000000000"));
        assert!(!extranonce.covers("a1"));
    }

    #[test]
    fn short_extranonce_uses_whole_value() {
        let extranonce: Extranonce = "ab".parse().unwrap();
        assert_eq!(extranonce.range_prefix(), "ab");
        assert!(extranonce.covers("ab00000000000000"));
    }
}
