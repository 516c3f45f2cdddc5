use tracing::subscriber::set_global_default;
use tracing::Subscriber;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_log::LogTracer;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter, Registry};

/// Builds the subscriber every binary and test installs: bunyan-formatted JSON
/// lines written to `sink`, filtered by `RUST_LOG` when it is set and by
/// `filter` otherwise.
///
/// The concrete layered type is hidden behind `impl Subscriber`; it has to be
/// `Send + Sync` so that [`init_subscriber`] can install it globally.
pub fn get_subscriber<Sink>(
    name: String,
    filter: String,
    sink: Sink,
) -> impl Subscriber + Send + Sync
where
    Sink: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let formatting_layer = BunyanFormattingLayer::new(name, sink);

    Registry::default()
        .with(env_filter)
        .with(JsonStorageLayer)
        .with(formatting_layer)
}

/// Installs `subscriber` globally and forwards `log` records (reqwest, actix)
/// into it. Must be called at most once per process.
pub fn init_subscriber(subscriber: impl Subscriber + Send + Sync) {
    LogTracer::builder()
        .with_max_level(log::LevelFilter::Trace)
        .init()
        .expect("Failed to set logger");
    set_global_default(subscriber).expect("Failed to set subscriber");
}
