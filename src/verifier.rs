use super::*;

/// Inputs to a KawPoW verification. All hex strings are as the miner sent
/// them, already validated; targets are 64 hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowRequest<'a> {
    pub header_hash: &'a str,
    pub mixhash: &'a str,
    pub nonce: &'a str,
    pub height: u64,
    pub share_target: &'a str,
    pub block_target: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowOutcome {
    pub is_share: bool,
    pub is_block: bool,
    /// Final KawPoW digest, which is also the block hash.
    pub digest: [u8; 32],
}

impl FromStr for PowOutcome {
    type Err = Error;

    /// `<valid> <is_share> <is_block> <digest>`, whitespace separated.
    fn from_str(s: &str) -> Result<Self> {
        let fields = s.split_whitespace().collect::<Vec<&str>>();

        let [_valid, is_share, is_block, digest] = fields.as_slice() else {
            bail!("expected 4 fields from verifier, got {}: `{s}`", fields.len());
        };

        let flag = |field: &str| -> Result<bool> {
            match field {
                "true" | "1" => Ok(true),
                "false" | "0" => Ok(false),
                other => bail!("invalid verifier flag `{other}`"),
            }
        };

        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digest, &mut bytes)
            .with_context(|| format!("invalid verifier digest `{digest}`"))?;

        Ok(Self {
            is_share: flag(*is_share)?,
            is_block: flag(*is_block)?,
            digest: bytes,
        })
    }
}

/// The KawPoW hash engine. Implementations must be safe to call from many
/// share submissions at once.
pub trait PowVerifier: Send + Sync {
    fn verify(&self, request: &PowRequest<'_>) -> Result<PowOutcome>;
}

/// Runs an external KawPoW helper once per share:
///
/// `<program> <header_hash> <mixhash> <nonce> <height> <share_target> <block_target>`
///
/// and parses a single [`PowOutcome`] line from its stdout.
#[derive(Debug, Clone)]
pub struct CommandVerifier {
    program: PathBuf,
}

impl CommandVerifier {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl PowVerifier for CommandVerifier {
    fn verify(&self, request: &PowRequest<'_>) -> Result<PowOutcome> {
        let output = Command::new(&self.program)
            .arg(request.header_hash)
            .arg(request.mixhash)
            .arg(request.nonce)
            .arg(request.height.to_string())
            .arg(request.share_target)
            .arg(request.block_target)
            .output()
            .with_context(|| format!("failed to run verifier `{}`", self.program.display()))?;

        ensure!(
            output.status.success(),
            "verifier `{}` exited with {}: {}",
            self.program.display(),
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );

        String::from_utf8(output.stdout)
            .context("verifier output is not valid UTF-8")?
            .trim()
            .parse()
    }
}
