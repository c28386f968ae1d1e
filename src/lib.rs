use {
    anyhow::{Context, Error, anyhow, bail, ensure},
    arguments::Arguments,
    backon::{ExponentialBuilder, Retryable},
    bitcoin::{
        Amount, OutPoint, ScriptBuf, Sequence, Transaction, TxIn, TxOut, Txid, VarInt, Witness,
        base58,
        consensus::encode,
        hashes::{Hash, sha256d},
        locktime::absolute::LockTime,
        script::write_scriptint,
        transaction,
    },
    clap::{Parser, ValueEnum},
    coinbase_builder::CoinbaseBuilder,
    event::Notifier,
    jobs::Jobs,
    parking_lot::{Mutex, RwLock},
    primitive_types::{U256, U512},
    reqwest::Url,
    serde::{
        Deserialize, Deserializer, Serialize, Serializer,
        de::{self, DeserializeOwned},
    },
    serde_json::{Value, json},
    serde_with::{DeserializeFromStr, SerializeDisplay},
    snafu::Snafu,
    std::{
        collections::{BTreeMap, HashMap, HashSet},
        env,
        fmt::{self, Display, Formatter},
        fs, io,
        net::{IpAddr, SocketAddr},
        path::PathBuf,
        process::{self, Command},
        str::FromStr,
        sync::{
            Arc, LazyLock,
            atomic::{AtomicU64, Ordering},
        },
        time::{Duration, Instant, SystemTime, UNIX_EPOCH},
    },
    stratum::is_hex_string,
    tokio::{
        runtime::Runtime,
        sync::{Notify, broadcast, mpsc},
        task::JoinSet,
        time::{MissedTickBehavior, interval_at},
    },
    tokio_util::sync::CancellationToken,
    tracing::{debug, error, info, warn},
    tracing_appender::non_blocking,
    tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt},
};

pub use {
    algorithm::{Algorithm, AlgorithmParams},
    block_template::{BlockTemplate, TemplateTransaction},
    counters::{ExtranonceCounter, JobCounter},
    daemon::{Daemon, DaemonError, DaemonEvent, DaemonUrl},
    difficulty::{DIFF1, share_difficulty, share_target, target_hex},
    event::{JobEvent, LogLevel},
    generator::spawn_generator,
    job::Job,
    job_manager::JobManager,
    payout::{Network, Payout, PayoutAddress, Recipient},
    settings::Settings,
    share::{Accepted, FoundBlock, ShareRecord, ShareSubmission},
    stratum::{Extranonce, JobId, StratumError},
    submitter::spawn_submitter,
    verifier::{CommandVerifier, PowOutcome, PowRequest, PowVerifier},
};

mod algorithm;
mod arguments;
mod block_template;
mod coinbase_builder;
mod counters;
mod daemon;
mod difficulty;
mod event;
mod generator;
mod job;
mod job_manager;
mod jobs;
mod logs;
pub mod options;
mod payout;
pub mod settings;
mod share;
mod signal;
mod subcommand;
mod submitter;
mod verifier;

pub const USER_AGENT: &str = "kawpool/0.1.0";
/// Shares for jobs whose template time is older than this are rejected.
pub const MAX_JOB_AGE: Duration = Duration::from_secs(600);
pub const NONCE_HEX_LEN: usize = 16;
pub const MIXHASH_HEX_LEN: usize = 64;
pub const EVENT_CHANNEL_CAPACITY: usize = 10_000;

type Result<T = (), E = Error> = std::result::Result<T, E>;

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

pub fn main() {
    let _guard = logs::init();

    let args = Arguments::parse();

    let runtime = match Runtime::new() {
        Ok(runtime) => runtime,
        Err(err) => {
            eprintln!("error: failed to create tokio runtime: {err}");
            process::exit(1);
        }
    };

    runtime.block_on(async {
        let cancel_token = signal::setup_signal_handler();

        match args.run(cancel_token).await {
            Err(err) => {
                eprintln!("error: {err}");

                for (i, cause) in err.chain().skip(1).enumerate() {
                    if i == 0 {
                        eprintln!();
                        eprintln!("because:");
                    }
                    eprintln!("- {cause}");
                }

                if env::var_os("RUST_BACKTRACE")
                    .map(|val| val == "1")
                    .unwrap_or_default()
                {
                    eprintln!();
                    eprintln!("{}", err.backtrace());
                }
                process::exit(1);
            }
            Ok(_) => {
                process::exit(0);
            }
        }
    });
}
