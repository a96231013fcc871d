//! Command to list the named environments of a configuration document.

use crate::error::CliError;
use crate::utils::{current_dir, locate_config, GlobalOptions};
use clap::Args;
use workercfg::config::environment_names;
use workercfg::ConfigLoader;

/// List the named environments.
#[derive(Args)]
pub struct EnvsCommand {}

impl EnvsCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let cwd = current_dir()?;
        let path = locate_config(global, &cwd)?;
        let raw = ConfigLoader::read_config(&cwd.join(&path))?;

        let names = environment_names(&raw);
        if names.is_empty() {
            global
                .logger()
                .info(&format!("{} declares no environments", path.display()));
        }
        for name in names {
            println!("{name}");
        }
        Ok(())
    }
}
