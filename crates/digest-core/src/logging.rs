use tracing_subscriber::EnvFilter;

/// Installs a `tracing_subscriber::fmt` subscriber honoring `RUST_LOG`,
/// falling back to `info` when unset. Intended for binaries embedding the
/// engine crates; library code never installs a global subscriber itself.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
