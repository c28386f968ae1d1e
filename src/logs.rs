use {super::*, tracing_appender::non_blocking::WorkerGuard};

const DEFAULT_FILTER: &str = "warn,kawpool=info";

/// Installs the global subscriber. Logs go to stderr through a background
/// writer so stdout stays clean for the JSON the subcommands print. The
/// returned guard flushes pending lines when dropped.
pub(crate) fn init() -> WorkerGuard {
    let (writer, guard) = non_blocking(io::stderr());

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(writer)
                .with_filter(filter),
        )
        .init();

    guard
}
