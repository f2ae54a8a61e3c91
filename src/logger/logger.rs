use crate::settings::Log;
use anyhow::{Result, anyhow};
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt,
    layer::{Layered, SubscriberExt},
    reload,
    util::SubscriberInitExt,
};

type Filtered = Layered<reload::Layer<EnvFilter, Registry>, Registry>;
type FormatLayer = Box<dyn Layer<Filtered> + Send + Sync>;
type Subscriber = Layered<reload::Layer<FormatLayer, Filtered>, Filtered>;

/// Global subscriber installed before settings are read. Both the filter and
/// the output format are swapped once the `[log]` section is known.
pub struct Logger {
    filter_handle: reload::Handle<EnvFilter, Registry>,
    format_handle: reload::Handle<FormatLayer, Filtered>,
}

impl Logger {
    pub fn new_bootstrap() -> Self {
        let (subscriber, logger) = Self::build();
        subscriber.init();
        logger
    }

    /// The handles stay usable only while the returned subscriber is alive.
    fn build() -> (Subscriber, Self) {
        let filter = EnvFilter::new("info");
        let (filter, filter_handle) = reload::Layer::new(filter);
        let (format, format_handle) = reload::Layer::new(format_layer(false));

        let subscriber = tracing_subscriber::registry().with(filter).with(format);

        (
            subscriber,
            Self {
                filter_handle,
                format_handle,
            },
        )
    }

    pub fn reload_from_settings(&self, log: &Log) -> Result<()> {
        let filter = EnvFilter::try_new(&log.filter).map_err(|e| anyhow!(e))?;
        self.filter_handle.reload(filter).map_err(|e| anyhow!(e))?;
        self.format_handle
            .reload(format_layer(log.json))
            .map_err(|e| anyhow!(e))?;
        Ok(())
    }
}

fn format_layer(json: bool) -> FormatLayer {
    if json {
        fmt::layer().json().boxed()
    } else {
        fmt::layer().boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(filter: &str, json: bool) -> Log {
        Log {
            filter: filter.into(),
            json,
        }
    }

    #[test]
    fn reload_applies_filter_and_json_format() {
        let (subscriber, logger) = Logger::build();
        logger.reload_from_settings(&log("debug", true)).unwrap();
        logger
            .reload_from_settings(&log("info,sqlx=warn", false))
            .unwrap();

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("emitted through the reloaded layers");
        });
    }

    #[test]
    fn invalid_filter_is_rejected() {
        let (_subscriber, logger) = Logger::build();
        assert!(
            logger
                .reload_from_settings(&log("user_api=notalevel", false))
                .is_err()
        );
    }

    #[test]
    fn reload_fails_once_subscriber_is_gone() {
        let (subscriber, logger) = Logger::build();
        drop(subscriber);
        assert!(logger.reload_from_settings(&log("debug", false)).is_err());
    }
}
