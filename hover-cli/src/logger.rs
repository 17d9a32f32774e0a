use env_logger::Env;

use crate::config::LogSettings;

/// Install the global logger on stderr; `RUST_LOG` overrides the configured level.
pub fn setup_logging(settings: &LogSettings) -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or(settings.level.as_str()))
        .format_timestamp_secs()
        .try_init()?;
    Ok(())
}
