//! CLI command implementations

pub mod models;
pub mod run;
pub mod show;

pub use models::models_command;
pub use run::run_command;
pub use show::show_command;
