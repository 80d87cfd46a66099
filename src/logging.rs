use std::env;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Console logging. `LOG_LEVEL` sets this crate's level; other crates stay at warn.
pub fn init_logging() {
    let level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let filter = EnvFilter::try_new(format!("warn,contribution_balancer={level}"))
        .unwrap_or_else(|_| EnvFilter::new("warn,contribution_balancer=info"));

    let console_layer = fmt::Layer::new()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter);

    tracing_subscriber::registry().with(console_layer).init();
}
