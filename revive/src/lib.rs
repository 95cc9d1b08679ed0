// Library entry point for the binary and the integration tests

pub mod error;
pub mod orchestrator;
pub mod provider_manager;
pub mod settings;
pub mod starter;
pub mod status;

pub use error::RestartError;
pub use orchestrator::{run, Cli, Outcome};
