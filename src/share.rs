use super::*;

/// A `mining.submit` as handed over by the stratum session layer. The job
/// id and hex fields are untrusted miner input; the rest is session state.
#[derive(Debug, Clone)]
pub struct ShareSubmission {
    pub job_id: String,
    pub previous_difficulty: Option<f64>,
    pub difficulty: f64,
    pub nonce: String,
    pub header_hash: String,
    pub mixhash: String,
    pub client_addr: SocketAddr,
    pub worker: String,
    pub extranonce1: Extranonce,
    pub solo: bool,
}

/// Result of a share that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accepted {
    pub block_hash: Option<String>,
}

/// A block solution waiting to be submitted to the daemon.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundBlock {
    pub record: ShareRecord,
    pub block_hex: String,
}

/// What gets reported for every share, accepted or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareRecord {
    pub job: String,
    pub ip: IpAddr,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub worker: String,
    pub difficulty: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_reward: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub share_diff: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_diff: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_diff_actual: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub solo: Option<bool>,
}

impl ShareRecord {
    pub(crate) fn rejected(submission: &ShareSubmission, error: StratumError) -> Self {
        Self {
            job: submission.job_id.clone(),
            ip: submission.client_addr.ip(),
            port: None,
            worker: submission.worker.clone(),
            difficulty: submission.difficulty,
            height: None,
            block_reward: None,
            share_diff: None,
            block_diff: None,
            block_diff_actual: None,
            block_hash: None,
            error: Some(error.to_string()),
            solo: None,
        }
    }

    #[allow(clippy::too_many_arguments)]
    pub(crate) fn accepted(
        submission: &ShareSubmission,
        height: u64,
        block_reward: Amount,
        share_diff: Option<String>,
        block_diff: f64,
        block_diff_actual: f64,
        block_hash: Option<String>,
    ) -> Self {
        Self {
            job: submission.job_id.clone(),
            ip: submission.client_addr.ip(),
            port: Some(submission.client_addr.port()),
            worker: submission.worker.clone(),
            difficulty: submission.difficulty,
            height: Some(height),
            block_reward: Some(block_reward.to_sat()),
            share_diff,
            block_diff: Some(block_diff),
            block_diff_actual: Some(block_diff_actual),
            block_hash,
            error: None,
            solo: Some(submission.solo),
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.error.is_none()
    }
}
