//! The `show-data-dir` command.

use clap::Args;

use crate::error::CliError;
use crate::utils::GlobalOptions;

/// Print the effective data directory.
#[derive(Debug, Args)]
pub struct ShowDataDirCommand {}

impl ShowDataDirCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        println!("{}", global.data_dir()?.display());
        Ok(())
    }
}
