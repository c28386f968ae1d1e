use super::*;

/// Owns the job table and validates shares against it.
///
/// Template transitions take the job table's write lock for their whole
/// duration, so concurrent templates are applied one at a time. Share
/// validation only holds the read lock long enough to look up its job.
///
/// Block solutions go to an unbounded queue separate from the lossy event
/// broadcast, so a lagging subscriber can never lose a block.
pub struct JobManager {
    algorithm: Algorithm,
    params: AlgorithmParams,
    blocks: mpsc::UnboundedSender<FoundBlock>,
    blocks_rx: Mutex<Option<mpsc::UnboundedReceiver<FoundBlock>>>,
    daemon: Arc<Daemon>,
    extranonces: ExtranonceCounter,
    jobs: RwLock<Jobs>,
    notifier: Notifier,
    payout: Payout,
    refresh: Notify,
    verifier: Arc<dyn PowVerifier>,
}

impl JobManager {
    pub fn new(settings: &Settings, verifier: Arc<dyn PowVerifier>) -> Result<Self> {
        let daemons = settings.daemons();

        ensure!(
            !daemons.is_empty(),
            "No daemons have been configured - pool cannot start"
        );

        let algorithm = settings.algorithm();

        let payout = Payout::new(
            settings.address()?,
            settings.recipients(),
            settings.network(),
            settings.pool_sig(),
        )?;

        let (blocks, blocks_rx) = mpsc::unbounded_channel();

        Ok(Self {
            algorithm,
            params: algorithm.params(),
            blocks,
            blocks_rx: Mutex::new(Some(blocks_rx)),
            daemon: Arc::new(Daemon::new(daemons.to_vec())?),
            extranonces: ExtranonceCounter,
            jobs: RwLock::new(Jobs::new()),
            notifier: Notifier::new(),
            payout,
            refresh: Notify::new(),
            verifier,
        })
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn daemon(&self) -> &Arc<Daemon> {
        &self.daemon
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.notifier.subscribe()
    }

    pub(crate) fn log(&self, level: LogLevel, message: impl Into<String>) {
        self.notifier.log(level, message);
    }

    /// The queue of block solutions. There is one consumer, so only the
    /// first call returns it.
    pub fn take_found_blocks(&self) -> Option<mpsc::UnboundedReceiver<FoundBlock>> {
        self.blocks_rx.lock().take()
    }

    /// Asks the generator to fetch a new template now instead of at its next
    /// tick.
    pub fn request_refresh(&self) {
        self.refresh.notify_one();
    }

    pub(crate) async fn refresh_requested(&self) {
        self.refresh.notified().await;
    }

    /// A fresh extranonce for a new stratum connection.
    pub fn next_extranonce(&self) -> Extranonce {
        self.extranonces.next()
    }

    pub fn current_job(&self) -> Option<Arc<Job>> {
        self.jobs.read().latest().cloned()
    }

    pub fn job(&self, id: JobId) -> Option<Arc<Job>> {
        self.jobs.read().get(&id)
    }

    pub fn valid_job_count(&self) -> usize {
        self.jobs.read().len()
    }

    /// Applies a template from the daemon. Returns true if it started a new
    /// round: the first template, or one on a different previous block hash
    /// at the same or a greater height. Everything else leaves the job table
    /// untouched.
    pub fn process_template(&self, template: BlockTemplate) -> Result<bool> {
        let mut jobs = self.jobs.write();

        if let Some(current) = jobs.latest() {
            if current.previous_block_hash() == template.previous_block_hash {
                return Ok(false);
            }

            if template.height < current.height() {
                debug!(
                    "Ignoring stale template at height {} (current {})",
                    template.height,
                    current.height()
                );
                return Ok(false);
            }
        }

        let job = jobs.build_next(|id| {
            Job::new(id, Arc::new(template), &self.payout, self.algorithm)
        })?;

        jobs.insert_and_clean(job.clone());
        drop(jobs);

        info!(
            "New block at height {} on {} (job {})",
            job.height(),
            job.previous_block_hash(),
            job.job_id
        );

        self.notifier.emit(JobEvent::NewBlock(job));

        Ok(true)
    }

    /// Replaces the current job with one built from `template` without
    /// invalidating the jobs before it.
    pub fn update_current_job(&self, template: BlockTemplate) -> Result<Arc<Job>> {
        let mut jobs = self.jobs.write();

        let job = jobs.build_next(|id| {
            Job::new(id, Arc::new(template), &self.payout, self.algorithm)
        })?;

        jobs.insert(job.clone());
        drop(jobs);

        debug!("Updated job {} at height {}", job.job_id, job.height());

        self.notifier.emit(JobEvent::UpdatedBlock {
            job: job.clone(),
            clean_jobs: true,
        });

        Ok(job)
    }

    /// Validates a share and reports the outcome to subscribers, accepted or
    /// not. Block solutions are also queued for submission, see
    /// [`JobManager::take_found_blocks`].
    pub fn process_share(&self, submission: &ShareSubmission) -> Result<Accepted, StratumError> {
        match self.check_share(submission, unix_now()) {
            Ok((record, block_hex)) => {
                let accepted = Accepted {
                    block_hash: record.block_hash.clone(),
                };

                if let Some(block_hex) = &block_hex {
                    let found = FoundBlock {
                        record: record.clone(),
                        block_hex: block_hex.clone(),
                    };

                    if self.blocks.send(found).is_err() {
                        error!(
                            "Block submission queue is closed, block {} was not queued",
                            accepted.block_hash.as_deref().unwrap_or("unknown")
                        );
                    }
                }

                self.notifier.emit(JobEvent::Share { record, block_hex });

                Ok(accepted)
            }
            Err(error) => {
                debug!(
                    "Rejected share from {} ({}): {error}",
                    submission.worker, submission.client_addr
                );

                self.notifier.emit(JobEvent::Share {
                    record: ShareRecord::rejected(submission, error),
                    block_hex: None,
                });

                Err(error)
            }
        }
    }

    /// Relays daemon lifecycle events as log notifications.
    pub fn spawn_daemon_monitor(
        self: &Arc<Self>,
        cancel: CancellationToken,
        tasks: &mut JoinSet<()>,
    ) {
        let manager = self.clone();
        let mut events = self.daemon.subscribe();

        tasks.spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = cancel.cancelled() => break,
                    event = events.recv() => event,
                };

                match event {
                    Ok(DaemonEvent::Online) => manager.log(LogLevel::Debug, "Daemon(s) online"),
                    Ok(DaemonEvent::ConnectionFailed(endpoints)) => manager.log(
                        LogLevel::Error,
                        format!("Failed to connect daemon(s): {}", endpoints.join(", ")),
                    ),
                    Ok(DaemonEvent::Error { endpoint, message }) => manager.log(
                        LogLevel::Error,
                        format!("Daemon {endpoint} error: {message}"),
                    ),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!("Daemon monitor skipped {skipped} events")
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    fn check_share(
        &self,
        submission: &ShareSubmission,
        submit_time: u64,
    ) -> Result<(ShareRecord, Option<String>), StratumError> {
        let job = submission
            .job_id
            .parse::<JobId>()
            .ok()
            .and_then(|id| self.job(id))
            .ok_or(StratumError::JobNotFound)?;

        let header_hash = job.header_hash();
        let header_hash_hex = hex::encode(header_hash);

        if job.current_time() < submit_time.saturating_sub(MAX_JOB_AGE.as_secs()) {
            return Err(StratumError::JobTooOld);
        }

        if !is_hex_string(&submission.header_hash) {
            return Err(StratumError::HeaderHashNotHex);
        }

        if !is_hex_string(&submission.nonce) {
            return Err(StratumError::NonceNotHex);
        }

        if !is_hex_string(&submission.mixhash) {
            return Err(StratumError::MixhashNotHex);
        }

        if submission.nonce.len() != NONCE_HEX_LEN {
            return Err(StratumError::NonceSize);
        }

        if submission.mixhash.len() != MIXHASH_HEX_LEN {
            return Err(StratumError::MixhashSize);
        }

        if !header_hash_hex.eq_ignore_ascii_case(&submission.header_hash) {
            return Err(StratumError::InvalidHeaderHash);
        }

        if !submission.extranonce1.covers(&submission.nonce) {
            return Err(StratumError::NonceOutOfRange);
        }

        if !job.register_submit(&header_hash_hex, &submission.nonce) {
            return Err(StratumError::Duplicate);
        }

        let share_target = share_target(self.params.diff_limit, submission.difficulty)
            .map_err(|err| {
                self.log(
                    LogLevel::Error,
                    format!("Invalid difficulty for {}: {err}", submission.worker),
                );
                StratumError::PowValidationFailed
            })?;

        let outcome = self
            .verifier
            .verify(&PowRequest {
                header_hash: &header_hash_hex,
                mixhash: &submission.mixhash,
                nonce: &submission.nonce,
                height: job.height(),
                share_target: &target_hex(share_target),
                block_target: &job.target_hex(),
            })
            .map_err(|err| {
                self.log(LogLevel::Error, format!("KawPoW verifier failed: {err:#}"));
                StratumError::PowValidationFailed
            })?;

        if !outcome.is_share && !outcome.is_block {
            return Err(StratumError::PowValidationFailed);
        }

        let block_diff = job.difficulty * self.params.multiplier;

        let (block_hash, block_hex, share_diff) = if outcome.is_block {
            let nonce = decode::<8>(&submission.nonce, StratumError::NonceNotHex)?;
            let mixhash = decode::<32>(&submission.mixhash, StratumError::MixhashNotHex)?;

            let block = job
                .serialize_block(&header_hash, &nonce, &mixhash)
                .map_err(|err| {
                    self.log(
                        LogLevel::Error,
                        format!("Failed to serialize block: {err:#}"),
                    );
                    StratumError::PowValidationFailed
                })?;

            let block_hash = hex::encode(outcome.digest);

            self.log(
                LogLevel::Special,
                format!(
                    "Block {block_hash} found at height {} by {}",
                    job.height(),
                    submission.worker
                ),
            );

            (
                Some(block_hash),
                Some(hex::encode(block)),
                share_difficulty(&outcome.digest, self.params.multiplier)
                    .map(|difficulty| format!("{difficulty:.8}")),
            )
        } else {
            (None, None, None)
        };

        Ok((
            ShareRecord::accepted(
                submission,
                job.height(),
                job.template.coinbase_value,
                share_diff,
                block_diff,
                job.difficulty,
                block_hash,
            ),
            block_hex,
        ))
    }
}

fn decode<const N: usize>(s: &str, error: StratumError) -> Result<[u8; N], StratumError> {
    let mut bytes = [0u8; N];
    hex::decode_to_slice(s, &mut bytes).map_err(|_| error)?;
    Ok(bytes)
}
