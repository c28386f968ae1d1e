use super::*;

const CONFIG_FILE_NAME: &str = "kawpool.toml";
const ENV_PREFIX: &str = "KAWPOOL_";

/// TOML config file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub algorithm: Option<Algorithm>,
    pub network: Option<Network>,
    pub daemons: Option<Vec<DaemonUrl>>,
    pub address: Option<PayoutAddress>,
    pub recipients: Option<Vec<Recipient>>,
    pub pool_sig: Option<String>,
    pub update_interval: Option<u64>,
    pub rebroadcast_timeout: Option<u64>,
    pub verifier_command: Option<PathBuf>,
}

/// Resolved configuration. Command line options win over `KAWPOOL_*`
/// environment variables, which win over the config file.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub config: Option<PathBuf>,
    pub config_dir: Option<PathBuf>,
    pub algorithm: Option<Algorithm>,
    pub network: Option<Network>,
    pub daemons: Option<Vec<DaemonUrl>>,
    pub address: Option<PayoutAddress>,
    pub recipients: Option<Vec<Recipient>>,
    pub pool_sig: Option<String>,
    pub update_interval: Option<u64>,
    pub rebroadcast_timeout: Option<u64>,
    pub verifier_command: Option<PathBuf>,
}

impl Settings {
    pub const DEFAULT_POOL_SIG: &str = "/kawpool/";
    pub const DEFAULT_UPDATE_INTERVAL: u64 = 1;
    pub const DEFAULT_REBROADCAST_TIMEOUT: u64 = 55;
    pub const DEFAULT_VERIFIER_COMMAND: &str = "kawpow-verify";

    pub fn load(options: crate::options::Options) -> Result<Self> {
        let mut env = BTreeMap::<String, String>::new();

        for (var, value) in std::env::vars_os() {
            let Some(var) = var.to_str() else {
                continue;
            };

            let Some(key) = var.strip_prefix(ENV_PREFIX) else {
                continue;
            };

            env.insert(
                key.into(),
                value.into_string().map_err(|value| {
                    anyhow!(
                        "environment variable `{var}` not valid unicode: `{}`",
                        value.to_string_lossy()
                    )
                })?,
            );
        }

        Self::merge(options, env)
    }

    pub fn merge(options: crate::options::Options, env: BTreeMap<String, String>) -> Result<Self> {
        let settings = Self::from_options(&options).or(Self::from_env(&env)?);

        let config = match Self::find_config_path(&settings) {
            Some(path) => toml::from_str::<Config>(
                &fs::read_to_string(&path)
                    .with_context(|| format!("failed to open config file `{}`", path.display()))?,
            )
            .with_context(|| format!("failed to deserialize config file `{}`", path.display()))?,
            None => Config::default(),
        };

        let settings = settings.or(Self::from_config(config));

        settings.validate()?;

        Ok(settings)
    }

    fn find_config_path(settings: &Self) -> Option<PathBuf> {
        if let Some(path) = &settings.config {
            return Some(path.clone());
        }

        if let Some(dir) = &settings.config_dir {
            let path = dir.join(CONFIG_FILE_NAME);
            if path.exists() {
                return Some(path);
            }
        }

        let path = dirs::config_dir()?.join("kawpool").join(CONFIG_FILE_NAME);

        path.exists().then_some(path)
    }

    pub fn from_options(options: &crate::options::Options) -> Self {
        Self {
            config: options.config.clone(),
            config_dir: options.config_dir.clone(),
            algorithm: options.algorithm,
            network: options.network,
            daemons: (!options.daemons.is_empty()).then(|| options.daemons.clone()),
            address: options.address.clone(),
            recipients: (!options.recipients.is_empty()).then(|| options.recipients.clone()),
            pool_sig: options.pool_sig.clone(),
            update_interval: options.update_interval,
            rebroadcast_timeout: options.rebroadcast_timeout,
            verifier_command: options.verifier_command.clone(),
        }
    }

    pub fn from_env(env: &BTreeMap<String, String>) -> Result<Self> {
        fn parse<T>(env: &BTreeMap<String, String>, key: &str) -> Result<Option<T>>
        where
            T: FromStr,
            T::Err: Into<Error>,
        {
            env.get(key)
                .map(|value| value.parse::<T>().map_err(Into::into))
                .transpose()
                .with_context(|| format!("failed to parse environment variable {ENV_PREFIX}{key}"))
        }

        fn parse_list<T>(env: &BTreeMap<String, String>, key: &str) -> Result<Option<Vec<T>>>
        where
            T: FromStr,
            T::Err: Into<Error>,
        {
            env.get(key)
                .map(|value| {
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|item| !item.is_empty())
                        .map(|item| item.parse::<T>().map_err(Into::into))
                        .collect::<Result<Vec<T>>>()
                })
                .transpose()
                .with_context(|| format!("failed to parse environment variable {ENV_PREFIX}{key}"))
        }

        Ok(Self {
            config: env.get("CONFIG").map(PathBuf::from),
            config_dir: env.get("CONFIG_DIR").map(PathBuf::from),
            algorithm: parse(env, "ALGORITHM")?,
            network: parse(env, "NETWORK")?,
            daemons: parse_list(env, "DAEMONS")?,
            address: parse(env, "ADDRESS")?,
            recipients: parse_list(env, "RECIPIENTS")?,
            pool_sig: env.get("POOL_SIG").cloned(),
            update_interval: parse(env, "UPDATE_INTERVAL")?,
            rebroadcast_timeout: parse(env, "REBROADCAST_TIMEOUT")?,
            verifier_command: env.get("VERIFIER_COMMAND").map(PathBuf::from),
        })
    }

    pub fn from_config(config: Config) -> Self {
        Self {
            config: None,
            config_dir: None,
            algorithm: config.algorithm,
            network: config.network,
            daemons: config.daemons,
            address: config.address,
            recipients: config.recipients,
            pool_sig: config.pool_sig,
            update_interval: config.update_interval,
            rebroadcast_timeout: config.rebroadcast_timeout,
            verifier_command: config.verifier_command,
        }
    }

    /// Merge self with another Settings, self takes priority
    pub fn or(self, other: Self) -> Self {
        Self {
            config: self.config.or(other.config),
            config_dir: self.config_dir.or(other.config_dir),
            algorithm: self.algorithm.or(other.algorithm),
            network: self.network.or(other.network),
            daemons: self.daemons.or(other.daemons),
            address: self.address.or(other.address),
            recipients: self.recipients.or(other.recipients),
            pool_sig: self.pool_sig.or(other.pool_sig),
            update_interval: self.update_interval.or(other.update_interval),
            rebroadcast_timeout: self.rebroadcast_timeout.or(other.rebroadcast_timeout),
            verifier_command: self.verifier_command.or(other.verifier_command),
        }
    }

    fn validate(&self) -> Result {
        ensure!(
            self.update_interval != Some(0),
            "update interval must be at least one second"
        );

        ensure!(
            self.rebroadcast_timeout != Some(0),
            "rebroadcast timeout must be at least one second"
        );

        Ok(())
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm.unwrap_or_default()
    }

    pub fn network(&self) -> Network {
        self.network.unwrap_or_default()
    }

    pub fn daemons(&self) -> &[DaemonUrl] {
        self.daemons.as_deref().unwrap_or_default()
    }

    pub fn address(&self) -> Result<&PayoutAddress> {
        self.address
            .as_ref()
            .ok_or_else(|| anyhow!("no pool payout address configured"))
    }

    pub fn recipients(&self) -> &[Recipient] {
        self.recipients.as_deref().unwrap_or_default()
    }

    pub fn pool_sig(&self) -> &str {
        self.pool_sig.as_deref().unwrap_or(Self::DEFAULT_POOL_SIG)
    }

    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(
            self.update_interval
                .unwrap_or(Self::DEFAULT_UPDATE_INTERVAL),
        )
    }

    pub fn rebroadcast_timeout(&self) -> Duration {
        Duration::from_secs(
            self.rebroadcast_timeout
                .unwrap_or(Self::DEFAULT_REBROADCAST_TIMEOUT),
        )
    }

    pub fn verifier_command(&self) -> PathBuf {
        self.verifier_command
            .clone()
            .unwrap_or_else(|| Self::DEFAULT_VERIFIER_COMMAND.into())
    }
}
