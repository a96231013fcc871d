//! CLI command implementations.
//!
//! - `validate`: Validate the configuration and report problems
//! - `show`: Print the normalized configuration
//! - `envs`: List the named environments
//! - `completions`: Generate shell completion scripts

pub mod completions;
pub mod envs;
pub mod show;
pub mod validate;

pub use completions::CompletionsCommand;
pub use envs::EnvsCommand;
pub use show::ShowCommand;
pub use validate::ValidateCommand;
