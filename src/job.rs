use super::*;

/// One unit of work: a block template plus the coinbase and merkle root the
/// pool built for it. Jobs are shared between the job table and in-flight
/// share validations; only the submission set is mutable.
#[derive(Debug)]
pub struct Job {
    pub job_id: JobId,
    pub template: Arc<BlockTemplate>,
    pub coinbase: Transaction,
    /// Internal byte order.
    pub merkle_root: [u8; 32],
    /// Network difficulty of the template target.
    pub difficulty: f64,
    pub created: Instant,
    algorithm: Algorithm,
    submits: Mutex<HashSet<(String, String)>>,
}

impl Job {
    pub fn new(
        job_id: JobId,
        template: Arc<BlockTemplate>,
        payout: &Payout,
        algorithm: Algorithm,
    ) -> Result<Self> {
        let coinbase = CoinbaseBuilder::new(template.height, template.coinbase_value, payout)
            .with_timestamp(unix_now())
            .build()
            .with_context(|| format!("failed to build coinbase for height {}", template.height))?;

        let merkle_root = bitcoin::merkle_tree::calculate_root(
            std::iter::once(coinbase.compute_txid()).chain(template.txids()),
        )
        .ok_or_else(|| anyhow!("merkle tree has no leaves"))?
        .to_byte_array();

        Ok(Self {
            job_id,
            difficulty: difficulty::target_difficulty(template.target),
            template,
            coinbase,
            merkle_root,
            created: Instant::now(),
            algorithm,
            submits: Mutex::new(HashSet::new()),
        })
    }

    pub fn height(&self) -> u64 {
        self.template.height
    }

    pub fn previous_block_hash(&self) -> bitcoin::BlockHash {
        self.template.previous_block_hash
    }

    pub fn current_time(&self) -> u64 {
        self.template.current_time
    }

    pub fn target(&self) -> U256 {
        self.template.target
    }

    pub fn target_hex(&self) -> String {
        target_hex(self.template.target)
    }

    /// The 80 bytes KawPoW hashes: version, previous block hash, merkle
    /// root, time, bits and height. Nonce and mixhash are not included.
    pub fn serialize_header(&self) -> Vec<u8> {
        let mut header = Vec::with_capacity(80);
        header.extend_from_slice(&self.template.version.to_le_bytes());
        header.extend_from_slice(&self.template.previous_block_hash.to_byte_array());
        header.extend_from_slice(&self.merkle_root);
        header.extend_from_slice(&(self.template.current_time as u32).to_le_bytes());
        header.extend_from_slice(&self.template.bits.to_le_bytes());
        header.extend_from_slice(&(self.template.height as u32).to_le_bytes());
        header
    }

    pub fn header_hash(&self) -> [u8; 32] {
        self.algorithm.params().header_hash(&self.serialize_header())
    }

    /// Full block bytes for a solved header. `nonce` and `mixhash` are in the
    /// order the miner sent them and are reversed into the block.
    pub fn serialize_block(
        &self,
        header_hash: &[u8; 32],
        nonce: &[u8; 8],
        mixhash: &[u8; 32],
    ) -> Result<Vec<u8>> {
        ensure!(
            *header_hash == self.header_hash(),
            "header hash {} does not belong to job {}",
            hex::encode(header_hash),
            self.job_id
        );

        let mut block = self.serialize_header();
        block.extend(nonce.iter().rev());
        block.extend(mixhash.iter().rev());
        block.extend(encode::serialize(&VarInt(
            self.template.transactions.len() as u64 + 1,
        )));
        block.extend(encode::serialize(&self.coinbase));

        for transaction in &self.template.transactions {
            block.extend_from_slice(&transaction.data);
        }

        Ok(block)
    }

    /// Records a (header hash, nonce) pair. Returns false if it was already
    /// submitted for this job. Case is ignored.
    pub fn register_submit(&self, header_hash: &str, nonce: &str) -> bool {
        self.submits
            .lock()
            .insert((header_hash.to_ascii_lowercase(), nonce.to_ascii_lowercase()))
    }
}
