//! Command to validate a worker configuration document.

use crate::error::CliError;
use crate::utils::{load_config, GlobalOptions};
use clap::Args;

/// Validate the configuration and report problems.
#[derive(Args)]
pub struct ValidateCommand {
    /// Exit with an error when warnings are reported
    #[arg(long)]
    pub deny_warnings: bool,
}

impl ValidateCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let result = load_config(global)?;
        let diagnostics = &result.diagnostics;

        if global.logger().report(diagnostics) {
            return Err(CliError::ValidationFailed(format!(
                "Configuration validation failed with {} error(s)",
                diagnostics.error_count()
            )));
        }

        if self.deny_warnings && diagnostics.has_warnings() {
            return Err(CliError::ValidationFailed(format!(
                "Configuration has {} warning(s)",
                diagnostics.warning_count()
            )));
        }

        println!("Configuration is valid");
        Ok(())
    }
}
