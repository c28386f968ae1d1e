use super::*;

/// The subset of a `getblocktemplate` response a job is built from.
#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct BlockTemplate {
    #[serde(with = "compact_hex")]
    pub bits: u32,
    #[serde(rename = "previousblockhash")]
    pub previous_block_hash: bitcoin::BlockHash,
    #[serde(rename = "curtime")]
    pub current_time: u64,
    pub height: u64,
    pub version: i32,
    #[serde(with = "target_hex_string")]
    pub target: U256,
    pub transactions: Vec<TemplateTransaction>,
    #[serde(rename = "coinbasevalue", with = "bitcoin::amount::serde::as_sat")]
    pub coinbase_value: Amount,
}

#[derive(Clone, PartialEq, Eq, Debug, Deserialize, Serialize)]
pub struct TemplateTransaction {
    pub txid: Txid,
    /// Raw transaction bytes, spliced into the block unchanged.
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
}

impl BlockTemplate {
    pub fn txids(&self) -> impl Iterator<Item = Txid> + '_ {
        self.transactions.iter().map(|tx| tx.txid)
    }

    /// True if both templates carry the same transactions in the same order.
    pub fn same_transactions(&self, other: &BlockTemplate) -> bool {
        self.txids().eq(other.txids())
    }
}

mod compact_hex {
    use super::*;

    pub(super) fn serialize<S: Serializer>(bits: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{bits:08x}"))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let s = String::deserialize(deserializer)?;
        u32::from_str_radix(&s, 16).map_err(de::Error::custom)
    }
}

mod target_hex_string {
    use super::*;

    pub(super) fn serialize<S: Serializer>(
        target: &U256,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&target_hex(*target))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<U256, D::Error> {
        let s = String::deserialize(deserializer)?;

        if s.is_empty() || s.len() > 64 {
            return Err(de::Error::custom(format!("invalid target `{s}`")));
        }

        U256::from_str_radix(&s, 16).map_err(de::Error::custom)
    }
}

mod hex_bytes {
    use super::*;

    pub(super) fn serialize<S: Serializer>(
        bytes: &Vec<u8>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(de::Error::custom)
    }
}
