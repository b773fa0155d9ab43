use std::io;

use anyhow::{Context, Result};
use tracing_subscriber::{
    filter::Directive,
    fmt::{format::FmtSpan, time::UtcTime},
    prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

pub const LOG_LEVEL_ENV: &str = "PHOTO_SEARCH_LOG_LEVEL";

const DEFAULT_DIRECTIVES: &str = "info";

/// Installs the global subscriber: human readable events on stderr.
pub fn init() -> Result<()> {
    let overrides = std::env::var(LOG_LEVEL_ENV).ok();
    let (filter, rejected) = log_filter(DEFAULT_DIRECTIVES, overrides.as_deref())?;
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_timer(UtcTime::rfc_3339())
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE)
        .with_filter(filter);

    tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .context("Failed to set global default tracing subscriber")?;

    for directive in rejected {
        tracing::warn!(%directive, env = LOG_LEVEL_ENV, "ignoring log directive");
    }

    Ok(())
}

/// Builds a filter from `defaults` plus the comma-separated `overrides`.
///
/// Override directives that don't parse are skipped and handed back, so they can be reported once
/// the subscriber is up.
fn log_filter(defaults: &str, overrides: Option<&str>) -> Result<(EnvFilter, Vec<String>)> {
    let base = EnvFilter::builder()
        .parse(defaults)
        .with_context(|| format!("invalid default log directives {defaults:?}"))?;

    let mut rejected = Vec::new();
    let filter = overrides
        .into_iter()
        .flat_map(|overrides| overrides.split(','))
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .fold(base, |filter, raw| match raw.parse::<Directive>() {
            Ok(directive) => filter.add_directive(directive),
            Err(err) => {
                rejected.push(format!("{raw:?}: {err}"));
                filter
            },
        });

    Ok((filter, rejected))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_are_merged() {
        let (filter, rejected) =
            log_filter("info", Some("photo_search=debug, ,surf=loud")).unwrap();
        let filter = filter.to_string();
        assert!(filter.contains("photo_search=debug"));
        assert!(filter.contains("info"));
        assert_eq!(rejected.len(), 1);
        assert!(rejected[0].starts_with("\"surf=loud\""));
    }

    #[test]
    fn test_defaults_only() {
        let (filter, rejected) = log_filter("warn", None).unwrap();
        assert_eq!(filter.to_string(), "warn");
        assert!(rejected.is_empty());
    }

    #[test]
    fn test_invalid_defaults_are_an_error() {
        assert!(log_filter("photo_search=loud", None).is_err());
    }
}
