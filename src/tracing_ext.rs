use std::env;

use tracing_subscriber::EnvFilter;

/// Log to stderr, filtered by `RUST_LOG`. `EPG_GRID_LOG_FORMAT=json` switches to JSON lines.
pub fn init_tracing() {
    let json = if let Some(format) = env::var_os("EPG_GRID_LOG_FORMAT") {
        format == "json"
    } else {
        false
    };

    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env());
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
