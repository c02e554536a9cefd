//! Multi-file logging.
//!
//! Besides the console, components can write to their own rolling files:
//!
//! | Log File          | Component                   | Target Prefixes                               |
//! |-------------------|-----------------------------|-----------------------------------------------|
//! | apiary.log        | Root logger (all events)    | (all)                                         |
//! | bus.log           | Message bus and reconciler  | apiary_bus                                    |
//! | cache.log         | Snapshot cache worker       | apiary_cache                                  |
//! | persistence.log   | Store and migrations        | apiary_persistence, apiary_migration          |
//! | auth.log          | Login, tokens and role gate | apiary_auth, apiary_server::middleware        |
//! | grpc.log          | Stored-procedure facade     | apiary_server::grpc                           |
//!
//! File logging is off unless `apiary_log_file` is set. Log files are stored
//! in `~/apiary/logs` by default.

use std::path::PathBuf;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

pub const ROOT_LOG_FILE: &str = "apiary.log";

struct ComponentLogDef {
    file_name: &'static str,
    targets: &'static [&'static str],
}

const COMPONENT_LOGS: &[ComponentLogDef] = &[
    ComponentLogDef {
        file_name: "bus.log",
        targets: &["apiary_bus"],
    },
    ComponentLogDef {
        file_name: "cache.log",
        targets: &["apiary_cache"],
    },
    ComponentLogDef {
        file_name: "persistence.log",
        targets: &["apiary_persistence", "apiary_migration"],
    },
    ComponentLogDef {
        file_name: "auth.log",
        targets: &["apiary_auth", "apiary_server::middleware"],
    },
    ComponentLogDef {
        file_name: "grpc.log",
        targets: &["apiary_server::grpc"],
    },
];

/// Log rotation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogRotation {
    Daily,
    Hourly,
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Daily => Rotation::DAILY,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Never => Rotation::NEVER,
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Base log directory (default: `~/apiary/logs`)
    pub log_dir: PathBuf,
    pub console_output: bool,
    /// Console lines as JSON objects instead of human-readable text
    pub json_format: bool,
    /// Fallback level when `RUST_LOG` is unset
    pub level: Level,
    pub file_logging: bool,
    pub rotation: LogRotation,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
        Self {
            log_dir: PathBuf::from(format!("{}/apiary/logs", home)),
            console_output: true,
            json_format: false,
            level: Level::INFO,
            file_logging: false,
            rotation: LogRotation::Daily,
        }
    }
}

impl LoggingConfig {
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.level.to_string()))
    }
}

/// Keeps the non-blocking file writers alive. Dropping it flushes them.
pub struct LoggingGuard {
    _file_guards: Vec<WorkerGuard>,
}

fn component_targets(component: &ComponentLogDef) -> Targets {
    component
        .targets
        .iter()
        .fold(Targets::new(), |targets, target| {
            targets.with_target(*target, LevelFilter::TRACE)
        })
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level for the console and the root
/// file. Component files take everything from their targets.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<LoggingGuard> {
    if config.file_logging {
        std::fs::create_dir_all(&config.log_dir)?;
    }

    let mut guards: Vec<WorkerGuard> = Vec::new();
    let mut layers: Vec<Box<dyn Layer<Registry> + Send + Sync>> = Vec::new();

    if config.console_output {
        if config.json_format {
            let layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_target(true)
                .with_filter(config.env_filter());
            layers.push(Box::new(layer));
        } else {
            let layer = fmt::layer()
                .with_target(true)
                .with_thread_names(true)
                .with_filter(config.env_filter());
            layers.push(Box::new(layer));
        }
    }

    if config.file_logging {
        let root_appender =
            RollingFileAppender::new(config.rotation.into(), &config.log_dir, ROOT_LOG_FILE);
        let (root_nb, root_guard) = tracing_appender::non_blocking(root_appender);
        guards.push(root_guard);

        let root_layer = fmt::layer()
            .with_writer(root_nb)
            .with_target(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .with_filter(config.env_filter());
        layers.push(Box::new(root_layer));

        for component in COMPONENT_LOGS {
            let appender = RollingFileAppender::new(
                config.rotation.into(),
                &config.log_dir,
                component.file_name,
            );
            let (nb, guard) = tracing_appender::non_blocking(appender);
            guards.push(guard);

            let layer = fmt::layer()
                .with_writer(nb)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_ansi(false)
                .with_filter(component_targets(component));
            layers.push(Box::new(layer));
        }
    }

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    if config.file_logging {
        tracing::info!(
            log_dir = %config.log_dir.display(),
            "File logging initialized: {} (root) + {} component log files",
            ROOT_LOG_FILE,
            COMPONENT_LOGS.len()
        );
    }

    Ok(LoggingGuard {
        _file_guards: guards,
    })
}
