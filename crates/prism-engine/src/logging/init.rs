use std::sync::Once;

use log::LevelFilter;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "prism_ambient=debug,wgpu=warn"). When absent, `RUST_LOG` is consulted, then
/// `default_level` applies.
///
/// `quiet_modules` are capped at `warn` unless the filter mentions them; the GPU
/// stack is chatty at `info` and would drown the animator's own diagnostics.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: LevelFilter,
    pub quiet_modules: Vec<&'static str>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: LevelFilter::Info,
            quiet_modules: vec!["wgpu_core", "wgpu_hal", "naga"],
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Idempotent; subsequent calls are ignored. Call early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        let filter = config.env_filter.or_else(|| std::env::var("RUST_LOG").ok());

        builder.filter_level(config.default_level);
        for module in &config.quiet_modules {
            let mentioned = filter.as_deref().is_some_and(|f| f.contains(module));
            if !mentioned {
                builder.filter_module(module, LevelFilter::Warn);
            }
        }

        if let Some(filter) = filter.as_deref() {
            builder.parse_filters(filter);
        }

        builder.write_style(config.write_style);
        builder.format_timestamp_millis();
        builder.init();

        log::debug!("logging initialized");
    });
}
