//! Tracing initialization logic.

use crate::{cli::DeviceClass, config::Config, util};
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "input_dispatch=info";

fn env_filter(cfg: &Config) -> EnvFilter {
    // RUST_LOG wins over --log-filter; --verbose only raises the default.
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let directives = if cfg.verbose && cfg.log_filter == DEFAULT_FILTER {
        "input_dispatch=debug"
    } else {
        cfg.log_filter.as_str()
    };
    EnvFilter::try_new(directives).unwrap_or_else(|e| {
        eprintln!("Warning: Invalid log filter '{directives}': {e}");
        EnvFilter::new(DEFAULT_FILTER) // Default filter on parse error
    })
}

/// Initialize the tracing subscriber: an fmt layer on stderr, text or JSON.
pub fn init_tracing(cfg: &Config) {
    let filter = env_filter(cfg);
    let registry = tracing_subscriber::registry().with(filter);

    if cfg.log_json {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_current_span(false);
        registry.with(fmt_layer).init();
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(cfg.verbose)
            .with_level(true);
        registry.with(fmt_layer).init();
    }

    info!(
        version = env!("CARGO_PKG_VERSION"),
        // Use option_env! for git sha to avoid build errors outside git repo
        git_sha = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        build_ts = option_env!("VERGEN_BUILD_TIMESTAMP").unwrap_or("unknown"),
        "input-dispatch starting"
    );

    let stats_interval = cfg
        .stats_interval()
        .map_or_else(|| "disabled".to_string(), util::format_duration);
    match cfg.class {
        DeviceClass::Pad => info!(
            class = "pad",
            axes = ?cfg.axes.iter().map(|(axis, _)| axis.name()).collect::<Vec<_>>(),
            format = ?cfg.format,
            stats_interval = %stats_interval,
            log_filter = %cfg.log_filter,
            "Configuration loaded"
        ),
        DeviceClass::Pointer => info!(
            class = "pointer",
            profile = ?cfg.profile,
            speed = cfg.speed,
            scale_x = cfg.scale.x,
            scale_y = cfg.scale.y,
            format = ?cfg.format,
            stats_interval = %stats_interval,
            log_filter = %cfg.log_filter,
            "Configuration loaded"
        ),
    }
}
