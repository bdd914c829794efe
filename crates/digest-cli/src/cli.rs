use std::path::PathBuf;

use clap::{Parser, ValueEnum};

fn parse_size_bytes(input: &str) -> Result<u64, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("size must not be empty".to_string());
    }

    let lower = s.to_ascii_lowercase();
    let (num, scale) = if let Some(raw) = lower.strip_suffix("kib") {
        (raw, 1024u64)
    } else if let Some(raw) = lower.strip_suffix("mib") {
        (raw, 1024u64 * 1024)
    } else if let Some(raw) = lower.strip_suffix("gib") {
        (raw, 1024u64 * 1024 * 1024)
    } else if let Some(raw) = lower.strip_suffix("kb") {
        (raw, 1000u64)
    } else if let Some(raw) = lower.strip_suffix("mb") {
        (raw, 1000u64 * 1000)
    } else if let Some(raw) = lower.strip_suffix("gb") {
        (raw, 1000u64 * 1000 * 1000)
    } else if let Some(raw) = lower.strip_suffix('b') {
        (raw, 1u64)
    } else {
        (lower.as_str(), 1u64)
    };

    let num = num.trim();
    if num.is_empty() {
        return Err(format!("invalid size: {input:?}"));
    }

    let value: u64 = num
        .parse()
        .map_err(|_| format!("invalid size number: {input:?}"))?;

    value
        .checked_mul(scale)
        .ok_or_else(|| format!("size too large: {input:?}"))
}

/// Scheduler mode selection mirrored from `digest_engine::SchedulerMode`;
/// kept as a separate `clap`-friendly type so the engine crate itself never
/// needs to depend on `clap`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SchedulerModeArg {
    /// Drive the backend from a dedicated blocking-pool thread.
    Blocking,
    /// Drive the backend by polling from a lightweight async task.
    Interval,
}

impl From<SchedulerModeArg> for digest_engine::SchedulerMode {
    fn from(value: SchedulerModeArg) -> Self {
        match value {
            SchedulerModeArg::Blocking => digest_engine::SchedulerMode::Blocking,
            SchedulerModeArg::Interval => digest_engine::SchedulerMode::Interval,
        }
    }
}

#[derive(Debug, Clone, Parser)]
#[command(
    name = "digest-cli",
    version,
    about = "Feeds a file (or stdin) through the streaming digest engine"
)]
pub struct Cli {
    /// File to digest. Reads from stdin when omitted.
    pub input: Option<PathBuf>,

    /// How many bytes to feed the backend per `feed()` call, simulating a
    /// chunked producer even when the whole input is already in memory.
    #[arg(
        long,
        env = "DIGEST_CHUNK_SIZE",
        default_value = "64KiB",
        value_parser = parse_size_bytes
    )]
    pub chunk_size: u64,

    /// Upper bound on total bytes this stream will accept; omit for no limit.
    #[arg(long, env = "DIGEST_FEED_SIZE", value_parser = parse_size_bytes)]
    pub feed_size: Option<u64>,

    /// Which scheduler drives the engine.
    #[arg(
        long,
        env = "DIGEST_SCHEDULER_MODE",
        value_enum,
        default_value_t = SchedulerModeArg::Blocking
    )]
    pub scheduler_mode: SchedulerModeArg,

    /// Wrap the demo backend in `FlakyBackend` to exercise retry handling.
    #[arg(long, env = "DIGEST_FLAKY", default_value_t = false)]
    pub flaky: bool,

    /// Seed for `FlakyBackend`'s RNG (only used with `--flaky`).
    #[arg(long, env = "DIGEST_FLAKY_SEED", default_value_t = 0)]
    pub flaky_seed: u64,

    /// Retry probability for `FlakyBackend` (only used with `--flaky`).
    #[arg(long, env = "DIGEST_FLAKY_RETRY_P", default_value_t = 0.2)]
    pub flaky_retry_probability: f64,
}
