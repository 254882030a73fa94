use tracing_subscriber::EnvFilter;

/// Filter directive for the requested verbosity; `RUST_LOG` wins when set
fn default_directive(verbose: bool, quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "batchtag=debug"
    } else {
        "batchtag=warn"
    }
}

/// Send diagnostics to stderr so stdout stays free for command output
pub fn init(verbose: bool, quiet: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose, quiet)));

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
