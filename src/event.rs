use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Warning,
    Error,
    /// Notable events such as found blocks.
    Special,
}

/// Everything the job manager reports to its subscribers.
#[derive(Debug, Clone)]
pub enum JobEvent {
    /// A template on a new previous block hash produced a new current job.
    NewBlock(Arc<Job>),
    /// The current job was replaced on the same previous block hash.
    UpdatedBlock { job: Arc<Job>, clean_jobs: bool },
    /// A share was processed. `block_hex` is set only for block solutions.
    Share {
        record: ShareRecord,
        block_hex: Option<String>,
    },
    Log { level: LogLevel, message: String },
}

/// Fan-out for [`JobEvent`]s. Sending never blocks and never fails; events
/// sent while nobody is subscribed are dropped.
#[derive(Debug, Clone)]
pub(crate) struct Notifier {
    tx: broadcast::Sender<JobEvent>,
}

impl Notifier {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.tx.subscribe()
    }

    pub(crate) fn emit(&self, event: JobEvent) {
        self.tx.send(event).ok();
    }

    /// Emits a log event and mirrors it to the tracing subscriber.
    pub(crate) fn log(&self, level: LogLevel, message: impl Into<String>) {
        let message = message.into();

        match level {
            LogLevel::Debug => debug!("{message}"),
            LogLevel::Warning => warn!("{message}"),
            LogLevel::Error => error!("{message}"),
            LogLevel::Special => info!("{message}"),
        }

        self.emit(JobEvent::Log { level, message });
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[test]
    fn emit_without_subscribers_is_fine() {
        let notifier = Notifier::new();
        notifier.log(LogLevel::Debug, "nobody listening");
    }

    #[test]
    fn log_reaches_subscriber() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();

        notifier.log(LogLevel::Special, "block found");

        match rx.try_recv().unwrap() {
            JobEvent::Log { level, message } => {
                assert_eq!(level, LogLevel::Special);
                assert_eq!(message, "block found");
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn log_level_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&LogLevel::Warning).unwrap(),
            r#""warning""#
        );
    }
}
