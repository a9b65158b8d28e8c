use anyhow::{bail, Context};
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_CONFIG_FILE: &str = "config.json";
pub const DEFAULT_DB_PATH: &str = "./CurrencyExchangeRate.db";

/// On-disk shape of the config file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    listen: String,
    stats_collect_interval: String,
    #[serde(default)]
    db_path: Option<String>,
}

pub struct Config {
    pub config_path: PathBuf,
    /// `host:port` to bind. Host names are resolved at bind time.
    pub listen_addr: String,
    /// Cadence of the background cache reload.
    pub refresh_interval: Duration,
    pub db_path: String,
}

impl Config {
    /// Loads the config file named by the first process argument, or
    /// `config.json` in the working directory.
    pub fn from_args() -> anyhow::Result<Self> {
        let path = std::env::args()
            .nth(1)
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
        Self::load(path)
    }

    /// Loads a JSON config file, then applies `PK_LISTEN_ADDR` and
    /// `PK_DB_PATH` overrides from the environment (or a `.env` file).
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config_path = std::path::absolute(path.as_ref())
            .with_context(|| format!("Invalid config path {}", path.as_ref().display()))?;
        tracing::info!("Loading config: {}", config_path.display());

        let raw = std::fs::read_to_string(&config_path)
            .with_context(|| format!("File error: {}", config_path.display()))?;
        let file: ConfigFile = serde_json::from_str(&raw).context("Config error")?;

        let listen = std::env::var("PK_LISTEN_ADDR").unwrap_or(file.listen);
        let listen_addr = parse_listen_addr(&listen)?;
        let refresh_interval = parse_duration(&file.stats_collect_interval)
            .context("Invalid statsCollectInterval")?;
        let db_path = std::env::var("PK_DB_PATH")
            .ok()
            .or(file.db_path)
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        Ok(Self {
            config_path,
            listen_addr,
            refresh_interval,
            db_path,
        })
    }
}

/// Accepts `host:port`, `[v6]:port`, or `:port` to bind every interface.
/// The host may be a name; only the port is checked here.
pub fn parse_listen_addr(listen: &str) -> anyhow::Result<String> {
    let listen = listen.trim();
    let Some((host, port)) = listen.rsplit_once(':') else {
        bail!("Invalid listen address {listen:?}: missing port");
    };
    port.parse::<u16>()
        .with_context(|| format!("Invalid listen address {listen:?}"))?;

    if host.is_empty() {
        Ok(format!("0.0.0.0:{port}"))
    } else {
        Ok(listen.to_string())
    }
}

/// Parses durations such as `30s`, `1m30s`, `500ms`, `1.5h` or `+2m`.
///
/// Units: `ns`, `us`/`µs`/`μs`, `ms`, `s`, `m`, `h`, and every number needs
/// one. A leading `+` is allowed. The total must be positive, so `-` forms
/// and zero are rejected.
pub fn parse_duration(input: &str) -> anyhow::Result<Duration> {
    let trimmed = input.trim();
    let s = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if s.is_empty() {
        bail!("empty duration");
    }

    let mut total = 0f64;
    let mut rest = s;
    while !rest.is_empty() {
        let num_len = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(rest.len());
        if num_len == 0 {
            bail!("invalid duration {input:?}");
        }
        let value: f64 = rest[..num_len]
            .parse()
            .with_context(|| format!("invalid duration {input:?}"))?;
        rest = &rest[num_len..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(rest.len());
        let nanos_per_unit = match &rest[..unit_len] {
            "ns" => 1.0,
            "us" | "µs" | "μs" => 1e3,
            "ms" => 1e6,
            "s" => 1e9,
            "m" => 60.0 * 1e9,
            "h" => 3600.0 * 1e9,
            "" => bail!("missing unit in duration {input:?}"),
            other => bail!("unknown unit {other:?} in duration {input:?}"),
        };
        rest = &rest[unit_len..];
        total += value * nanos_per_unit;
    }

    if total < 1.0 {
        bail!("duration {input:?} must be positive");
    }
    Ok(Duration::from_nanos(total as u64))
}
