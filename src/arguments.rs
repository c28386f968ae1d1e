use {
    super::*,
    clap::builder::styling::{AnsiColor, Effects, Styles},
    options::Options,
    subcommand::Subcommand,
};

#[derive(Debug, Parser)]
#[command(
  version,
  styles = Styles::styled()
    .error(AnsiColor::Red.on_default() | Effects::BOLD)
    .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
    .invalid(AnsiColor::Red.on_default())
    .literal(AnsiColor::Blue.on_default())
    .placeholder(AnsiColor::Cyan.on_default())
    .usage(AnsiColor::Yellow.on_default() | Effects::BOLD)
    .valid(AnsiColor::Green.on_default()),
)]
pub(crate) struct Arguments {
    #[command(flatten)]
    pub(crate) options: Options,
    #[command(subcommand)]
    pub(crate) subcommand: Subcommand,
}

impl Arguments {
    pub(crate) async fn run(self, cancel_token: CancellationToken) -> Result {
        let settings = Settings::load(self.options)?;
        self.subcommand.run(settings, cancel_token).await
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq};

    #[test]
    fn parse_watch() {
        let arguments = Arguments::try_parse_from([
            "kawpool",
            "--daemon",
            "http://u:p@127.0.0.1:8766",
            "--daemon",
            "http://127.0.0.1:8767",
            "--update-interval",
            "2",
            "watch",
        ])
        .unwrap();

        assert_eq!(arguments.options.daemons.len(), 2);
        assert_eq!(arguments.options.update_interval, Some(2));
        assert!(matches!(arguments.subcommand, Subcommand::Watch(_)));
    }

    #[test]
    fn parse_check() {
        let mixhash = "ee".repeat(32);
        let arguments = Arguments::try_parse_from([
            "kawpool",
            "--network",
            "testnet",
            "check",
            "--nonce",
            "a1b2000000000000",
            "--mixhash",
            mixhash.as_str(),
            "--extranonce1",
            "a1b2c3",
        ])
        .unwrap();

        assert_eq!(arguments.options.network, Some(Network::Testnet));
        assert!(matches!(arguments.subcommand, Subcommand::Check(_)));
    }

    #[test]
    fn rejects_bad_daemon_url() {
        assert!(Arguments::try_parse_from(["kawpool", "--daemon", "nope", "watch"]).is_err());
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Arguments::try_parse_from(["kawpool"]).is_err());
    }
}
