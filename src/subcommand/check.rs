use super::*;

#[derive(Debug, Parser)]
pub(crate) struct Check {
    #[arg(long, help = "Share <NONCE> as 16 hex characters.", requires = "mixhash")]
    nonce: Option<String>,
    #[arg(long, help = "Share <MIXHASH> as 64 hex characters.", requires = "nonce")]
    mixhash: Option<String>,
    #[arg(
        long,
        help = "Share <HEADER_HASH>. Defaults to the header hash of the new job."
    )]
    header_hash: Option<String>,
    #[arg(
        long,
        help = "Worker <EXTRANONCE1>. Defaults to an empty extranonce that covers every nonce."
    )]
    extranonce1: Option<Extranonce>,
    #[arg(long, default_value_t = 1.0, help = "Share <DIFFICULTY>.")]
    difficulty: f64,
    #[arg(long, help = "Submit the block if the share solves one.")]
    submit: bool,
}

#[derive(Debug, Serialize)]
struct Output {
    job: JobSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    share: Option<ShareOutput>,
}

#[derive(Debug, Serialize)]
struct ShareOutput {
    record: ShareRecord,
    submitted: bool,
}

impl Check {
    pub(crate) async fn run(self, settings: Settings) -> Result {
        let manager = build_manager(&settings)?;

        manager.daemon().init().await?;

        let template = manager
            .daemon()
            .get_block_template()
            .await
            .context("failed to fetch block template")?;

        manager.process_template(template)?;

        let job = manager
            .current_job()
            .ok_or_else(|| anyhow!("daemon template produced no job"))?;

        let share = match (self.nonce, self.mixhash) {
            (Some(nonce), Some(mixhash)) => {
                let submission = ShareSubmission {
                    job_id: job.job_id.to_string(),
                    previous_difficulty: None,
                    difficulty: self.difficulty,
                    nonce,
                    header_hash: self
                        .header_hash
                        .unwrap_or_else(|| hex::encode(job.header_hash())),
                    mixhash,
                    client_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
                    worker: "check".into(),
                    extranonce1: self
                        .extranonce1
                        .unwrap_or_else(|| Extranonce::from_bytes(&[])),
                    solo: false,
                };

                Some(check_share(&manager, &submission, self.submit).await?)
            }
            _ => None,
        };

        let output = Output {
            job: JobSummary::new(&job, true),
            share,
        };

        println!("{}", serde_json::to_string_pretty(&output)?);

        Ok(())
    }
}

async fn check_share(
    manager: &JobManager,
    submission: &ShareSubmission,
    submit: bool,
) -> Result<ShareOutput> {
    let mut blocks = manager
        .take_found_blocks()
        .ok_or_else(|| anyhow!("found block queue already taken"))?;
    let mut events = manager.subscribe();

    if let Err(err) = manager.process_share(submission) {
        info!("Share rejected: {err}");
    }

    let record = loop {
        match events.try_recv() {
            Ok(JobEvent::Share { record, .. }) => break record,
            Ok(_) => continue,
            Err(err) => bail!("share result was not reported: {err}"),
        }
    };

    let submitted = match blocks.try_recv() {
        Ok(block) if submit => {
            manager.daemon().submit_block(&block.block_hex).await?;
            true
        }
        _ => false,
    };

    Ok(ShareOutput { record, submitted })
}
