//! Structured logging for the `tertulia` binary.
//!
//! Diagnostics go to `stderr` so rendered command output on `stdout` stays
//! clean. [`LogSettings`] captures the format and filter resolved from the
//! environment; [`init_logging`] installs them once per process.

use std::{env, io, str::FromStr, sync::OnceLock};

use thiserror::Error;
use tracing::{debug, subscriber::SetGlobalDefaultError, warn};
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, filter::ParseError, fmt::format::FmtSpan, layer::SubscriberExt,
};

/// Environment variable selecting `human` or `json` log output.
pub const LOG_FORMAT_ENV: &str = "TERTULIA_LOG_FORMAT";

/// Environment variable holding `EnvFilter` directives.
pub const LOG_FILTER_ENV: &str = "RUST_LOG";

/// Directives applied when [`LOG_FILTER_ENV`] is unset or blank.
pub const DEFAULT_DIRECTIVES: &str = "info";

static INSTALLED: OnceLock<()> = OnceLock::new();

/// Errors raised while resolving or installing the log subscriber.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum LoggingError {
    /// A logging variable held bytes that are not UTF-8.
    #[error("environment variable `{name}` contained invalid UTF-8: {source}")]
    InvalidUnicode {
        /// Offending variable.
        name: &'static str,
        /// Lookup failure.
        #[source]
        source: env::VarError,
    },
    /// `TERTULIA_LOG_FORMAT` named a format other than `human` or `json`.
    #[error("unsupported log format `{provided}`; expected `human` or `json`")]
    UnsupportedFormat {
        /// Normalised value supplied by the user.
        provided: String,
    },
    /// `RUST_LOG` could not be parsed as filter directives.
    #[error("invalid log filter `{directives}`: {source}")]
    InvalidFilter {
        /// Directives as supplied.
        directives: String,
        /// Parser failure.
        #[source]
        source: ParseError,
    },
    /// Another subscriber already owns the global default.
    #[error("failed to install tracing subscriber: {source}")]
    InstallFailed {
        /// Error raised by `tracing`.
        #[source]
        source: SetGlobalDefaultError,
    },
}

/// Shape of each line written to `stderr`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Compact text for terminals.
    #[default]
    Human,
    /// One JSON object per event, with the active span list.
    Json,
}

impl FromStr for LogFormat {
    type Err = LoggingError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let normalised = raw.trim().to_ascii_lowercase();
        match normalised.as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            _ => Err(LoggingError::UnsupportedFormat {
                provided: normalised,
            }),
        }
    }
}

/// Format and filter for the process-wide subscriber.
#[derive(Debug)]
pub struct LogSettings {
    format: LogFormat,
    filter: EnvFilter,
}

impl LogSettings {
    /// Reads [`LOG_FORMAT_ENV`] and [`LOG_FILTER_ENV`].
    ///
    /// # Errors
    /// Returns [`LoggingError`] when either variable is not UTF-8 or does not
    /// parse.
    pub fn from_env() -> Result<Self, LoggingError> {
        let format = read_var(LOG_FORMAT_ENV)?;
        let directives = read_var(LOG_FILTER_ENV)?;
        Self::from_values(format.as_deref(), directives.as_deref())
    }

    /// Builds settings from raw variable values; `None` means unset.
    ///
    /// # Errors
    /// Returns [`LoggingError::UnsupportedFormat`] or
    /// [`LoggingError::InvalidFilter`].
    ///
    /// # Examples
    /// ```
    /// use tertulia_cli::logging::{LogFormat, LogSettings};
    ///
    /// let settings = LogSettings::from_values(Some("JSON"), None)?;
    /// assert_eq!(settings.format(), LogFormat::Json);
    /// assert_eq!(settings.filter().to_string(), "info");
    /// # Ok::<(), tertulia_cli::logging::LoggingError>(())
    /// ```
    pub fn from_values(format: Option<&str>, directives: Option<&str>) -> Result<Self, LoggingError> {
        let format = format.map(str::parse).transpose()?.unwrap_or_default();
        let directives = directives
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .unwrap_or(DEFAULT_DIRECTIVES);
        let filter = EnvFilter::try_new(directives).map_err(|source| LoggingError::InvalidFilter {
            directives: directives.to_owned(),
            source,
        })?;
        Ok(Self { format, filter })
    }

    /// Selected output format.
    #[must_use]
    pub const fn format(&self) -> LogFormat {
        self.format
    }

    /// Resolved filter.
    #[must_use]
    pub const fn filter(&self) -> &EnvFilter {
        &self.filter
    }

    fn into_layer(self) -> Box<dyn Layer<Registry> + Send + Sync> {
        let layer = tracing_subscriber::fmt::layer()
            .with_span_events(FmtSpan::CLOSE)
            .with_writer(io::stderr);
        match self.format {
            LogFormat::Human => layer.with_filter(self.filter).boxed(),
            LogFormat::Json => layer
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_filter(self.filter)
                .boxed(),
        }
    }
}

/// Installs the `stderr` subscriber described by the environment.
///
/// Later calls are no-ops. When some other subscriber already owns the
/// global default it is kept and a warning is sent through it.
///
/// # Errors
/// Returns [`LoggingError`] when the environment cannot be resolved into
/// [`LogSettings`].
pub fn init_logging() -> Result<(), LoggingError> {
    if INSTALLED.get().is_some() {
        return Ok(());
    }
    match install(LogSettings::from_env()?) {
        Ok(()) => {}
        Err(LoggingError::InstallFailed { source }) => {
            warn!(error = %source, "tracing already configured; keeping the existing subscriber");
        }
        Err(err) => return Err(err),
    }
    INSTALLED.get_or_init(|| ());
    Ok(())
}

fn install(settings: LogSettings) -> Result<(), LoggingError> {
    let subscriber = tracing_subscriber::registry().with(settings.into_layer());
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|source| LoggingError::InstallFailed { source })?;
    if let Err(err) = LogTracer::init() {
        debug!(error = %err, "`log` records already have a destination");
    }
    Ok(())
}

fn read_var(name: &'static str) -> Result<Option<String>, LoggingError> {
    match env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(LoggingError::InvalidUnicode { name, source }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use rstest::rstest;

    #[rstest]
    #[case(None, LogFormat::Human)]
    #[case(Some("human"), LogFormat::Human)]
    #[case(Some("HUMAN"), LogFormat::Human)]
    #[case(Some(" json "), LogFormat::Json)]
    fn formats_resolve(#[case] raw: Option<&str>, #[case] expected: LogFormat) {
        let settings = LogSettings::from_values(raw, None).expect("format must parse");
        assert_eq!(settings.format(), expected);
    }

    #[rstest]
    #[case("Logfmt", "logfmt")]
    #[case(" ", "")]
    fn unknown_formats_are_rejected(#[case] raw: &str, #[case] provided: &str) {
        let err = raw.parse::<LogFormat>().expect_err("only human and json are supported");
        match err {
            LoggingError::UnsupportedFormat { provided: got } => assert_eq!(got, provided),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[rstest]
    #[case(None, "info")]
    #[case(Some("   "), "info")]
    #[case(Some("tertulia_core=debug"), "tertulia_core=debug")]
    fn filters_default_to_info(#[case] raw: Option<&str>, #[case] expected: &str) {
        let settings = LogSettings::from_values(None, raw).expect("filter must parse");
        assert_eq!(settings.filter().to_string(), expected);
    }

    #[test]
    fn malformed_filters_are_rejected() {
        let err = LogSettings::from_values(None, Some("tertulia_core=loud"))
            .expect_err("`loud` is not a level");
        assert!(matches!(
            err,
            LoggingError::InvalidFilter { ref directives, .. } if directives == "tertulia_core=loud"
        ));
    }

    #[test]
    fn init_logging_is_idempotent() {
        init_logging().expect("logging must initialise");
        init_logging().expect("subsequent calls must be no-ops");
    }
}
