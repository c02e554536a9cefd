//! Process startup: logging, servers and shutdown coordination

mod grpc;
mod http;
mod logging;
mod shutdown;

pub use self::grpc::serve_grpc;
pub use self::http::{cors, http_server};
pub use self::logging::{LogRotation, LoggingConfig, LoggingGuard, ROOT_LOG_FILE, init_logging};
pub use self::shutdown::{Supervisor, drain, run_with_shutdown, spawn_signal_listener};
