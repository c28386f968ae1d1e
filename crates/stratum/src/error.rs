use super::*;

pub type Result<T = (), E = InternalError> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum InternalError {
    #[snafu(display("{message}"))]
    Parse { message: String },
}

/// Reasons a submitted share is rejected. The numeric codes are the ones
/// miners see in the `mining.submit` error response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Snafu)]
pub enum StratumError {
    #[snafu(display("job not found"))]
    JobNotFound,
    #[snafu(display("job is too old"))]
    JobTooOld,
    #[snafu(display("invalid header hash, must be hex"))]
    HeaderHashNotHex,
    #[snafu(display("invalid nonce, must be hex"))]
    NonceNotHex,
    #[snafu(display("invalid mixhash, must be hex"))]
    MixhashNotHex,
    #[snafu(display("incorrect size of nonce, must be 8 bytes"))]
    NonceSize,
    #[snafu(display("incorrect size of mixhash, must be 32 bytes"))]
    MixhashSize,
    #[snafu(display("invalid header hash"))]
    InvalidHeaderHash,
    #[snafu(display("nonce out of worker range"))]
    NonceOutOfRange,
    #[snafu(display("duplicate share"))]
    Duplicate,
    #[snafu(display("pow validation failed"))]
    PowValidationFailed,
}

impl StratumError {
    pub fn code(self) -> i32 {
        match self {
            Self::Duplicate => 22,
            Self::NonceOutOfRange => 24,
            _ => 20,
        }
    }
}

impl Serialize for StratumError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(3)?;
        tuple.serialize_element(&self.code())?;
        tuple.serialize_element(&self.to_string())?;
        tuple.serialize_element(&Option::<()>::None)?;
        tuple.end()
    }
}
