use super::*;

/// Chain parameters that matter for payout addresses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
    Regtest,
}

impl Network {
    pub fn p2pkh_prefix(self) -> u8 {
        match self {
            Self::Mainnet => 60,
            Self::Testnet | Self::Regtest => 111,
        }
    }

    pub fn p2sh_prefix(self) -> u8 {
        match self {
            Self::Mainnet => 122,
            Self::Testnet | Self::Regtest => 196,
        }
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mainnet => write!(f, "mainnet"),
            Self::Testnet => write!(f, "testnet"),
            Self::Regtest => write!(f, "regtest"),
        }
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "mainnet" | "main" => Ok(Self::Mainnet),
            "testnet" | "test" => Ok(Self::Testnet),
            "regtest" => Ok(Self::Regtest),
            _ => bail!("invalid network `{s}`"),
        }
    }
}

/// A base58check payout address. The network is checked when the address is
/// turned into a script, not when it is parsed.
#[derive(Debug, Clone, PartialEq, Eq, DeserializeFromStr, SerializeDisplay)]
pub struct PayoutAddress {
    encoded: String,
    version: u8,
    hash: [u8; 20],
}

impl PayoutAddress {
    pub fn script_pubkey(&self, network: Network) -> Result<ScriptBuf> {
        let mut script = Vec::with_capacity(25);

        if self.version == network.p2pkh_prefix() {
            script.extend_from_slice(&[0x76, 0xa9, 0x14]);
            script.extend_from_slice(&self.hash);
            script.extend_from_slice(&[0x88, 0xac]);
        } else if self.version == network.p2sh_prefix() {
            script.extend_from_slice(&[0xa9, 0x14]);
            script.extend_from_slice(&self.hash);
            script.push(0x87);
        } else {
            bail!(
                "address `{}` has version byte {} which is not valid on {network}",
                self.encoded,
                self.version
            );
        }

        Ok(ScriptBuf::from_bytes(script))
    }
}

impl Display for PayoutAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl FromStr for PayoutAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let payload =
            base58::decode_check(s).map_err(|err| anyhow!("invalid address `{s}`: {err}"))?;

        ensure!(
            payload.len() == 21,
            "invalid address `{s}`: expected 21 byte payload, got {}",
            payload.len()
        );

        let mut hash = [0u8; 20];
        hash.copy_from_slice(&payload[1..]);

        Ok(Self {
            encoded: s.into(),
            version: payload[0],
            hash,
        })
    }
}

/// A share of the block reward paid to an extra address.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Recipient {
    pub address: PayoutAddress,
    pub percent: f64,
}

impl FromStr for Recipient {
    type Err = Error;

    /// `ADDRESS:PERCENT`
    fn from_str(s: &str) -> Result<Self> {
        let (address, percent) = s
            .rsplit_once(':')
            .ok_or_else(|| anyhow!("invalid recipient `{s}`: expected ADDRESS:PERCENT"))?;

        Ok(Self {
            address: address.parse()?,
            percent: percent
                .parse()
                .with_context(|| format!("invalid recipient percent `{percent}`"))?,
        })
    }
}

impl Display for Recipient {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.percent)
    }
}

/// Where the coinbase pays out, resolved against the network once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payout {
    pool_script: ScriptBuf,
    recipients: Vec<(ScriptBuf, u64)>,
    pool_sig: String,
}

impl Payout {
    /// Percent values are stored in millionths so the split is integer math.
    const PERCENT_SCALE: f64 = 1_000_000.0;
    const FULL_SHARE: u64 = 100_000_000;

    pub fn new(
        address: &PayoutAddress,
        recipients: &[Recipient],
        network: Network,
        pool_sig: impl Into<String>,
    ) -> Result<Self> {
        let mut total = 0u64;
        let mut resolved = Vec::with_capacity(recipients.len());

        for recipient in recipients {
            ensure!(
                recipient.percent.is_finite() && recipient.percent > 0.0,
                "recipient `{}` must have a positive percent",
                recipient.address
            );

            let share = (recipient.percent * Self::PERCENT_SCALE).round() as u64;

            total = total.saturating_add(share);

            resolved.push((recipient.address.script_pubkey(network)?, share));
        }

        ensure!(
            total <= Self::FULL_SHARE,
            "recipient percents add up to {}, more than 100",
            total as f64 / Self::PERCENT_SCALE
        );

        Ok(Self {
            pool_script: address.script_pubkey(network)?,
            recipients: resolved,
            pool_sig: pool_sig.into(),
        })
    }

    pub fn pool_sig(&self) -> &str {
        &self.pool_sig
    }

    /// Splits `value` between recipients, each rounded down, and gives the
    /// remainder to the pool address. The pool output comes first.
    pub fn outputs(&self, value: Amount) -> Vec<TxOut> {
        let total = value.to_sat();
        let scale = u128::from(Self::FULL_SHARE);

        let mut remainder = total;
        let mut outputs = Vec::with_capacity(self.recipients.len() + 1);

        for (script, share) in &self.recipients {
            let amount = (u128::from(total) * u128::from(*share) / scale) as u64;
            let amount = amount.min(remainder);
            remainder -= amount;
            outputs.push(TxOut {
                value: Amount::from_sat(amount),
                script_pubkey: script.clone(),
            });
        }

        outputs.insert(
            0,
            TxOut {
                value: Amount::from_sat(remainder),
                script_pubkey: self.pool_script.clone(),
            },
        );

        outputs
    }
}
