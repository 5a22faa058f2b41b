use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

/// Filter target for this crate's own pipeline logs.
const CRATE_TARGET: &str = "lead_insight";

#[derive(Debug)]
pub enum TelemetryError {
    Filter { directives: String, source: ParseError },
    Subscriber(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Filter { directives, .. } => {
                write!(f, "invalid log filter '{}'", directives)
            }
            TelemetryError::Subscriber(err) => write!(f, "telemetry error: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::Filter { source, .. } => Some(source),
            TelemetryError::Subscriber(err) => Some(&**err),
        }
    }
}

/// Install the process-wide subscriber. `RUST_LOG` wins when set;
/// otherwise the configured level applies to this crate's pipeline logs
/// while the HTTP stack stays at warn.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(&config.log_level)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Subscriber)
}

/// A bare level ("debug") is scoped to the crate target so scoring
/// `debug!` audits do not drag hyper and reqwest along; a string with
/// explicit directives is taken as written.
fn build_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    let directives = if level.contains(['=', ',']) {
        level.to_string()
    } else {
        format!("warn,{CRATE_TARGET}={level}")
    };

    EnvFilter::try_new(&directives).map_err(|source| TelemetryError::Filter {
        directives,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_level_is_scoped_to_the_crate_target() {
        let filter = build_filter("debug").expect("valid level");
        let rendered = filter.to_string();
        assert!(
            rendered.contains("lead_insight=debug"),
            "got '{rendered}'"
        );
        assert!(rendered.contains("warn"), "got '{rendered}'");
    }

    #[test]
    fn explicit_directives_pass_through_unchanged() {
        let filter = build_filter("info,hyper=debug").expect("valid directives");
        let rendered = filter.to_string();
        assert!(rendered.contains("hyper=debug"), "got '{rendered}'");
        assert!(
            !rendered.contains("lead_insight"),
            "must not rewrite explicit directives, got '{rendered}'"
        );
    }

    #[test]
    fn invalid_level_reports_the_directives_it_built() {
        let err = build_filter("loudest").expect_err("not a level");
        match err {
            TelemetryError::Filter { directives, .. } => {
                assert!(directives.contains("lead_insight=loudest"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
