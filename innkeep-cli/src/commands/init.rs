//! The `init` command.

use std::fs;

use clap::Args;

use crate::error::CliError;
use crate::utils::GlobalOptions;

const STARTER_CONFIG: &str = "\
# innkeep configuration
#
# hold_ttl_minutes: 30
# default_currency: EUR
# maximum_lock_wait_seconds: 5
# output_format: table
# retention:
#   outbox_days: 90
";

/// Initialize the data directory and database.
#[derive(Debug, Args)]
pub struct InitCommand {
    /// Also write a commented starter config.yaml
    #[arg(long)]
    pub with_config: bool,
}

impl InitCommand {
    /// Creates the data directory, the database with its schema, and
    /// optionally a starter configuration file.
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let dir = global.data_dir()?;
        fs::create_dir_all(&dir)?;

        // Opening initializes the schema on a fresh file.
        let config = global.load_configuration()?;
        let _db = global.create_database(&config)?;

        if self.with_config {
            let config_path = dir.join("config.yaml");
            if config_path.exists() {
                println!("config.yaml already exists, leaving it alone");
            } else {
                fs::write(&config_path, STARTER_CONFIG)?;
                println!("Wrote {}", config_path.display());
            }
        }

        println!("Initialized innkeep data directory at {}", dir.display());
        Ok(())
    }
}
