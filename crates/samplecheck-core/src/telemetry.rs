//! Tracing initialisation for the samplecheck binary.
//!
//! stdout belongs to the console report and to the `discover` JSON that the
//! CI workflow captures into a matrix, so every log line is written to
//! stderr instead.

use tracing::{Level, Subscriber};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global tracing subscriber, logging to stderr.
///
/// `RUST_LOG` wins over `level`. Only the first call takes effect.
pub fn init_tracing(json: bool, level: Level) {
    subscriber(json, level, std::io::stderr).try_init().ok();
}

/// Subscriber with an `EnvFilter` and a plain or JSON formatter writing to
/// `writer`.
pub fn subscriber<W>(json: bool, level: Level, writer: W) -> Box<dyn Subscriber + Send + Sync>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));
    let layer = fmt::layer().with_target(false).with_writer(writer);

    let registry = tracing_subscriber::registry().with(env_filter);
    if json {
        Box::new(registry.with(layer.json()))
    } else {
        Box::new(registry.with(layer))
    }
}
