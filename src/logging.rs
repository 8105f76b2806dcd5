use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber for the binaries. `RUST_LOG` wins over the
/// verbosity flag.
pub fn init(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
