/// Log setup for the binary.
///
/// The library only emits `tracing` events; installing a subscriber is up
/// to the host. `RUST_LOG` overrides the default level.

use tracing_subscriber::EnvFilter;

/// Install a stderr subscriber. `verbose` lowers the default level to debug.
pub fn init(verbose: bool) {
    let default = if verbose { "sightings=debug" } else { "sightings=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    // A second init (e.g. in tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
