use super::*;

mod check;
mod watch;

#[derive(Debug, Parser)]
pub(crate) enum Subcommand {
    #[command(about = "Build a job from the current template and optionally check a share")]
    Check(check::Check),
    #[command(about = "Track block templates and print every job")]
    Watch(watch::Watch),
}

impl Subcommand {
    pub(crate) async fn run(self, settings: Settings, cancel_token: CancellationToken) -> Result {
        match self {
            Self::Check(check) => check.run(settings).await,
            Self::Watch(watch) => watch.run(settings, cancel_token).await,
        }
    }
}

fn build_manager(settings: &Settings) -> Result<Arc<JobManager>> {
    let verifier = Arc::new(CommandVerifier::new(settings.verifier_command()));
    Ok(Arc::new(JobManager::new(settings, verifier)?))
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub(crate) struct JobSummary {
    pub(crate) job_id: JobId,
    pub(crate) height: u64,
    pub(crate) previous_block_hash: bitcoin::BlockHash,
    pub(crate) header_hash: String,
    pub(crate) target: String,
    pub(crate) difficulty: f64,
    pub(crate) transactions: usize,
    pub(crate) coinbase_value: u64,
    pub(crate) clean_jobs: bool,
}

impl JobSummary {
    pub(crate) fn new(job: &Job, clean_jobs: bool) -> Self {
        Self {
            job_id: job.job_id,
            height: job.height(),
            previous_block_hash: job.previous_block_hash(),
            header_hash: hex::encode(job.header_hash()),
            target: job.target_hex(),
            difficulty: job.difficulty,
            transactions: job.template.transactions.len(),
            coinbase_value: job.template.coinbase_value.to_sat(),
            clean_jobs,
        }
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::job::tests::job, pretty_assertions::assert_eq};

    #[test]
    fn summary_reflects_job() {
        let job = job(0xcccd, 42);
        let summary = JobSummary::new(&job, true);

        assert_eq!(summary.job_id, JobId::new(0xcccd));
        assert_eq!(summary.height, 42);
        assert_eq!(summary.header_hash.len(), 64);
        assert_eq!(summary.target, job.target_hex());
        assert_eq!(summary.transactions, 0);
        assert_eq!(summary.coinbase_value, 250_000_000_000);
        assert!(summary.clean_jobs);
    }

    #[test]
    fn summary_serializes_job_id_as_hex() {
        let value = serde_json::to_value(JobSummary::new(&job(0xcccd, 42), false)).unwrap();
        assert_eq!(value["job_id"], json!(JobId::new(0xcccd).to_string()));
        assert_eq!(value["clean_jobs"], json!(false));
    }
}
