use super::*;

/// Proof-of-work algorithms the job manager can drive. Only KawPoW exists
/// today; the descriptor is resolved once at startup and never changes.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, DeserializeFromStr, SerializeDisplay,
)]
pub enum Algorithm {
    #[default]
    Kawpow,
}

/// Per-algorithm constants used by share validation.
#[derive(Debug, Clone, Copy)]
pub struct AlgorithmParams {
    /// Scales share and block difficulty for display and accounting.
    pub multiplier: f64,
    /// Target at difficulty 1; assigned difficulties divide this.
    pub diff_limit: U256,
    header_hasher: fn(&[u8]) -> [u8; 32],
}

impl AlgorithmParams {
    /// Hash of the 80-byte header in the byte order miners receive it.
    pub fn header_hash(&self, header: &[u8]) -> [u8; 32] {
        (self.header_hasher)(header)
    }
}

impl Algorithm {
    pub fn params(self) -> AlgorithmParams {
        match self {
            Self::Kawpow => AlgorithmParams {
                multiplier: 1.0,
                diff_limit: *DIFF1,
                header_hasher: sha256d_reversed,
            },
        }
    }
}

fn sha256d_reversed(data: &[u8]) -> [u8; 32] {
    let mut hash = sha256d::Hash::hash(data).to_byte_array();
    hash.reverse();
    hash
}

impl Display for Algorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kawpow => write!(f, "kawpow"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "kawpow" => Ok(Self::Kawpow),
            other => bail!("unsupported algorithm `{other}`"),
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[test]
    fn kawpow_params() {
        let params = Algorithm::Kawpow.params();
        assert_eq!(params.multiplier, 1.0);
        assert_eq!(
            target_hex(params.diff_limit),
            "00000000ff000000000000000000000000000000000000000000000000000000"
        );
    }

    #[test]
    fn header_hash_is_reversed_double_sha256() {
        let params = Algorithm::Kawpow.params();
        let header = [0u8; 80];
        let mut expected = sha256d::Hash::hash(&header).to_byte_array();
        expected.reverse();
        assert_eq!(params.header_hash(&header), expected);
        assert_ne!(params.header_hash(&header), params.header_hash(&[1u8; 80]));
    }

    #[test]
    fn parse_and_display() {
        assert_eq!("kawpow".parse::<Algorithm>().unwrap(), Algorithm::Kawpow);
        assert_eq!("KawPow".parse::<Algorithm>().unwrap(), Algorithm::Kawpow);
        assert_eq!(Algorithm::Kawpow.to_string(), "kawpow");
        assert!("sha256".parse::<Algorithm>().is_err());
    }

    #[test]
    fn serde_uses_lowercase_name() {
        assert_eq!(
            serde_json::to_string(&Algorithm::Kawpow).unwrap(),
            r#""kawpow""#
        );
        assert_eq!(
            serde_json::from_str::<Algorithm>(r#""kawpow""#).unwrap(),
            Algorithm::Kawpow
        );
    }
}
