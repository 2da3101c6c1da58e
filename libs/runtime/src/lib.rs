//! Process bootstrap shared by the campus binaries: layered configuration,
//! home directory resolution and logging.

pub mod config;
pub mod home_dir;
pub mod logging;

pub use config::{AppConfig, CliArgs, DatabaseConfig, LoggingConfig, Section, ServerConfig};
pub use home_dir::resolve_home_dir;
pub use logging::init_logging_from_config;
