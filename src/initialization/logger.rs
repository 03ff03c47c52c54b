//! Logger initialization.
//!
//! Lines are tagged with the pipeline component that emitted them
//! (`discovery`, `extraction`, `publish`, `run`, ...) rather than the full
//! module path, so a scheduled run's log reads as a sequence of stages.

use std::io::Write;

use colored::*;
use log::{Level, LevelFilter};

use crate::config::LogFormat;
use crate::error_handling::InitializationError;

/// Dependencies that are chatty at the levels shopmap itself logs at.
const QUIET_MODULES: &[(&str, LevelFilter)] = &[
    ("html5ever", LevelFilter::Error),
    ("selectors", LevelFilter::Warn),
    ("reqwest", LevelFilter::Info),
    ("hyper", LevelFilter::Info),
    ("hyper_util", LevelFilter::Info),
];

/// Installs the process-wide logger.
///
/// `RUST_LOG` is read first so per-module directives still work; `level` then
/// sets the default and shopmap's own level. `Json` writes one object per
/// line for the scheduler's log collector.
///
/// # Errors
///
/// Returns `InitializationError::LoggerError` if a logger is already installed.
pub fn init_logger_with(level: LevelFilter, format: LogFormat) -> Result<(), InitializationError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_level(level);
    for (module, filter) in QUIET_MODULES {
        builder.filter_module(module, *filter);
    }
    builder.filter_module("shopmap", level);

    match format {
        LogFormat::Json => {
            builder.format(|buf, record| {
                writeln!(
                    buf,
                    "{}",
                    json_line(
                        chrono::Utc::now().timestamp_millis(),
                        record.level(),
                        record.target(),
                        &record.args().to_string(),
                    )
                )
            });
        }
        LogFormat::Plain => {
            colored::control::set_override(true);
            builder.format(|buf, record| {
                let level = record.level();
                let tag = format!("{:<5}", level);
                let tag = match level {
                    Level::Error => tag.red().bold(),
                    Level::Warn => tag.yellow(),
                    Level::Info => tag.green(),
                    Level::Debug | Level::Trace => tag.dimmed(),
                };
                writeln!(
                    buf,
                    "{} {} {:<11} {}",
                    chrono::Local::now().format("%H:%M:%S"),
                    tag,
                    component(record.target()).cyan(),
                    record.args()
                )
            });
        }
    }

    builder.try_init().map_err(InitializationError::from)?;
    Ok(())
}

/// Pipeline component for a log target.
///
/// `shopmap::extraction::gemini` becomes `extraction`; targets from other
/// crates keep their crate name.
fn component(target: &str) -> &str {
    let mut parts = target.split("::");
    match (parts.next(), parts.next()) {
        (Some("shopmap"), Some(module)) => module,
        (Some(krate), _) => krate,
        _ => target,
    }
}

fn json_line(ts_millis: i64, level: Level, target: &str, message: &str) -> String {
    serde_json::json!({
        "ts": ts_millis,
        "level": level.as_str(),
        "component": component(target),
        "target": target,
        "msg": message,
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_names_pipeline_stage() {
        assert_eq!(component("shopmap::extraction::gemini"), "extraction");
        assert_eq!(component("shopmap::run"), "run");
        assert_eq!(component("shopmap"), "shopmap");
        assert_eq!(component("reqwest::connect"), "reqwest");
    }

    #[test]
    fn test_json_line_is_one_object() {
        let line = json_line(
            1_752_000_000_000,
            Level::Warn,
            "shopmap::publish",
            "Dropping record without an address: \"銀座書店\"",
        );
        assert!(!line.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&line).expect("valid JSON");
        assert_eq!(value["level"], "WARN");
        assert_eq!(value["component"], "publish");
        assert_eq!(value["target"], "shopmap::publish");
        assert_eq!(value["msg"], "Dropping record without an address: \"銀座書店\"");
    }

    // env_logger installs a process-wide logger, so only the first init in
    // this test binary can succeed.
    #[test]
    fn test_second_init_reports_error() {
        let _ = init_logger_with(LevelFilter::Warn, LogFormat::Plain);

        let result = init_logger_with(LevelFilter::Debug, LogFormat::Json);
        assert!(matches!(result, Err(InitializationError::LoggerError(_))));
    }
}
