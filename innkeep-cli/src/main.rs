//! innkeep command-line interface.

mod cli;
mod commands;
mod error;
mod utils;

use clap::Parser;

use cli::{Cli, Commands};
use utils::GlobalOptions;

fn main() {
    let cli = Cli::parse();

    let _level = innkeep::init_logger(cli.verbose, cli.quiet);

    let global = GlobalOptions {
        data_dir: cli.data_dir.clone(),
        busy_timeout: cli.busy_timeout,
    };

    let result = match cli.command {
        Commands::Init(cmd) => cmd.execute(&global),
        Commands::AddProperty(cmd) => cmd.execute(&global),
        Commands::AddRoomType(cmd) => cmd.execute(&global),
        Commands::SetInventory(cmd) => cmd.execute(&global),
        Commands::ShowInventory(cmd) => cmd.execute(&global),
        Commands::CreateHold(cmd) => cmd.execute(&global),
        Commands::ExpireHold(cmd) => cmd.execute(&global),
        Commands::ExpireDue(cmd) => cmd.execute(&global),
        Commands::CancelHold(cmd) => cmd.execute(&global),
        Commands::ConvertHold(cmd) => cmd.execute(&global),
        Commands::ListHolds(cmd) => cmd.execute(&global),
        Commands::ListEvents(cmd) => cmd.execute(&global),
        Commands::Audit(cmd) => cmd.execute(&global),
        Commands::SweepOutbox(cmd) => cmd.execute(&global),
        Commands::ShowDataDir(cmd) => cmd.execute(&global),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(err.exit_code());
    }
}
