//! Tracing setup for the sandbox binary and tests.

use tracing_subscriber::EnvFilter;

/// Installs a stderr subscriber honoring `RUST_LOG`, with `default` as the floor.
pub fn init_tracing(default: tracing::Level) {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default.into()))
        .with_writer(std::io::stderr)
        .init();
}

/// Routes logs through the test harness. Safe to call from every test.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
