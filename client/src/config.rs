use configparser::ini::Ini;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{ClientError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "client_config.ini";
const SECTION: &str = "Global";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
const DEFAULT_ACTIVITY_LIMIT: u64 = 10;

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    pub http_url: String,
    pub ws_url: String,
    pub payer_path: String,
    pub admin_path: String,
    pub orange_staking_program: Pubkey,
    pub stake_mint: Pubkey,
    pub poll_interval: Duration,
    pub activity_limit: usize,
    pub commitment: CommitmentConfig,
}

pub fn load_cfg(client_config: &str) -> Result<ClientConfig> {
    let mut config = Ini::new();
    config
        .load(client_config)
        .map_err(|e| ClientError::Config(format!("{client_config}: {e}")))?;
    ClientConfig::from_ini(&config)
}

impl ClientConfig {
    pub fn from_ini(config: &Ini) -> Result<Self> {
        let poll_interval_secs = optional_uint(config, "poll_interval_secs")?
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        if poll_interval_secs == 0 {
            return Err(ClientError::Config(
                "poll_interval_secs must be positive".to_string(),
            ));
        }
        let activity_limit =
            optional_uint(config, "activity_limit")?.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
        let commitment = match config.get(SECTION, "commitment") {
            Some(level) if !level.is_empty() => CommitmentConfig::from_str(&level)
                .map_err(|_| ClientError::Config(format!("unknown commitment {level:?}")))?,
            _ => CommitmentConfig::confirmed(),
        };

        Ok(ClientConfig {
            http_url: required(config, "http_url")?,
            ws_url: required(config, "ws_url")?,
            payer_path: required(config, "payer_path")?,
            admin_path: required(config, "admin_path")?,
            orange_staking_program: required_pubkey(config, "orange_staking_program")?,
            stake_mint: required_pubkey(config, "stake_mint")?,
            poll_interval: Duration::from_secs(poll_interval_secs),
            activity_limit: usize::try_from(activity_limit)
                .map_err(|_| ClientError::Config("activity_limit out of range".to_string()))?,
            commitment,
        })
    }
}

fn required(config: &Ini, key: &str) -> Result<String> {
    match config.get(SECTION, key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ClientError::Config(format!("{key} must not be empty"))),
    }
}

fn required_pubkey(config: &Ini, key: &str) -> Result<Pubkey> {
    let value = required(config, key)?;
    Pubkey::from_str(&value).map_err(|e| ClientError::Config(format!("{key}: {e}")))
}

fn optional_uint(config: &Ini, key: &str) -> Result<Option<u64>> {
    config
        .getuint(SECTION, key)
        .map_err(|e| ClientError::Config(format!("{key}: {e}")))
}
