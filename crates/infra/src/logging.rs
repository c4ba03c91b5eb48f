use crate::config::AppConfig;
use anyhow::Result;
use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global subscriber for the hubs-cms process. Production
/// emits JSON lines for the log pipeline; everywhere else gets compact
/// console output so restore and backup summaries stay readable.
///
/// `log_level` takes a full `EnvFilter` directive, so per-target levels
/// like `info,hubs_infra=debug` work.
pub fn init_tracing(config: &AppConfig) -> Result<()> {
    let filter =
        EnvFilter::try_new(config.log_level.clone()).unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = fmt().with_env_filter(filter).with_target(false);
    if config.is_production() {
        builder.json().init();
    } else {
        builder.compact().init();
    }

    Ok(())
}
