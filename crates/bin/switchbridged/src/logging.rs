//! Subscriber setup with a reloadable filter.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

use switchbridge_app::ports::LogLevelControl;
use switchbridge_domain::error::BoxError;

const CRATES: [&str; 4] = [
    "switchbridged",
    "switchbridge_app",
    "switchbridge_adapter_ble",
    "switchbridge_adapter_virtual",
];

/// Install the global subscriber. An unparseable `filter` falls back to
/// `info` with a warning.
pub fn init(filter: &str) -> ReloadControl {
    let (env_filter, base, rejected) = match EnvFilter::try_new(filter) {
        Ok(env_filter) => (env_filter, filter.to_string(), None),
        Err(err) => {
            let fallback = directives_for(Level::INFO);
            (EnvFilter::new(&fallback), fallback, Some(err))
        }
    };
    let (layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(layer)
        .with(fmt::layer())
        .init();

    if let Some(err) = rejected {
        tracing::warn!(%filter, error = %err, "invalid log filter, using info");
    }
    ReloadControl { handle, base }
}

/// Filter directives applying `level` to every bridge crate.
fn directives_for(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    CRATES
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Target a directive applies to, e.g. `btleplug` for `btleplug[scan]=debug`.
fn directive_target(directive: &str) -> &str {
    directive
        .split(['=', '['])
        .next()
        .unwrap_or(directive)
        .trim()
}

/// `base` with the bridge crates switched to `level`. Directives for other
/// targets and the default level are kept as configured.
fn with_level(base: &str, level: Level) -> String {
    base.split(',')
        .map(str::trim)
        .filter(|directive| !directive.is_empty() && !CRATES.contains(&directive_target(directive)))
        .map(str::to_string)
        .chain(std::iter::once(directives_for(level)))
        .collect::<Vec<_>>()
        .join(",")
}

/// Swaps the active filter when the host asks for a new level.
pub struct ReloadControl {
    handle: reload::Handle<EnvFilter, Registry>,
    /// Filter the subscriber was installed with.
    base: String,
}

impl LogLevelControl for ReloadControl {
    fn set_level(&self, level: Level) -> Result<(), BoxError> {
        let filter = EnvFilter::try_new(with_level(&self.base, level))?;
        self.handle.reload(filter).map_err(Into::into)
    }
}
