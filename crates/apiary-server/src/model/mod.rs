pub mod app_state;
pub mod config;

pub use app_state::AppState;
pub use config::Configuration;
