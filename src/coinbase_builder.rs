use super::*;

/// Builds the generation transaction for a job. The script sig carries the
/// BIP34 height, an optional timestamp and the pool signature; the outputs
/// come from the [`Payout`] split.
#[derive(Clone)]
pub(crate) struct CoinbaseBuilder<'a> {
    height: u64,
    payout: &'a Payout,
    timestamp: Option<u64>,
    value: Amount,
}

impl<'a> CoinbaseBuilder<'a> {
    const MAX_COINBASE_SCRIPT_SIG_SIZE: usize = 100;

    pub(crate) fn new(height: u64, value: Amount, payout: &'a Payout) -> Self {
        Self {
            height,
            payout,
            timestamp: None,
            value,
        }
    }

    pub(crate) fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub(crate) fn build(self) -> Result<Transaction> {
        let mut buf = Vec::with_capacity(Self::MAX_COINBASE_SCRIPT_SIG_SIZE);

        let mut height = [0u8; 8];
        let len = write_scriptint(
            &mut height,
            i64::try_from(self.height).context("block height out of range")?,
        );
        buf.push(len as u8);
        buf.extend_from_slice(&height[..len]);

        if let Some(timestamp) = self.timestamp {
            let mut encoded = [0u8; 8];
            let len = write_scriptint(
                &mut encoded,
                i64::try_from(timestamp).context("timestamp out of range")?,
            );
            buf.push(len as u8);
            buf.extend_from_slice(&encoded[..len]);
        }

        buf.extend_from_slice(self.payout.pool_sig().as_bytes());

        let script_sig = ScriptBuf::from_bytes(buf);
        let script_sig_size = script_sig.len();

        ensure!(
            script_sig_size <= Self::MAX_COINBASE_SCRIPT_SIG_SIZE,
            "coinbase script sig is {script_sig_size} bytes (max {})",
            Self::MAX_COINBASE_SCRIPT_SIG_SIZE
        );

        Ok(Transaction {
            version: transaction::Version::ONE,
            lock_time: LockTime::ZERO,
            input: vec![TxIn {
                previous_output: OutPoint::null(),
                script_sig,
                sequence: Sequence::MAX,
                witness: Witness::new(),
            }],
            output: self.payout.outputs(self.value),
        })
    }
}
