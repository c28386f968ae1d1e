use {
    rand::RngCore,
    serde::{Serialize, Serializer, ser::SerializeTuple},
    serde_with::{DeserializeFromStr, SerializeDisplay},
    snafu::Snafu,
    std::{
        fmt::{self, Display, Formatter},
        str::FromStr,
    },
};

pub use {
    error::{InternalError, Result, StratumError},
    extranonce::Extranonce,
    hex_string::is_hex_string,
    job_id::JobId,
};

mod error;
mod extranonce;
mod hex_string;
mod job_id;
