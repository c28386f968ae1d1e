use super::*;

/// Job identifier. On the wire it is a 32-byte value with the counter in the
/// low eight bytes, so the hex form is 48 zeros followed by 16 hex digits.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay,
)]
#[repr(transparent)]
pub struct JobId(u64);

impl JobId {
    pub const HEX_LEN: usize = 64;

    pub fn new(n: u64) -> Self {
        Self(n)
    }
}

impl FromStr for JobId {
    type Err = InternalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != Self::HEX_LEN
            || !s
                .bytes()
                .all(|c| c.is_ascii_digit() || (b'a'..=b'f').contains(&c))
        {
            return Err(InternalError::Parse {
                message: format!(
                    "invalid job id '{s}': expected {} lowercase hex characters",
                    Self::HEX_LEN
                ),
            });
        }

        let (high, low) = s.split_at(Self::HEX_LEN - 16);

        if high.bytes().any(|c| c != b'0') {
            return Err(InternalError::Parse {
                message: format!("invalid job id '{s}': high 24 bytes must be zero"),
            });
        }

        let id = u64::from_str_radix(low, 16).map_err(|e| InternalError::Parse {
            message: format!("invalid job id '{s}': {e}"),
        })?;

        Ok(JobId(id))
    }
}

impl Display for JobId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:064x}", self.0)
    }
}

impl From<JobId> for u64 {
    fn from(id: JobId) -> u64 {
        id.0
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> JobId {
        JobId(id)
    }
}
