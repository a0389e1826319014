//! Command implementations.
//!
//! Each command is a `clap` args struct with an
//! `execute(self, &GlobalOptions) -> Result<(), CliError>` method; the
//! dispatcher in `main` does nothing but route to it.

mod add_property;
mod add_room_type;
mod audit;
mod cancel_hold;
mod convert_hold;
mod create_hold;
mod expire_hold;
mod init;
mod list_events;
mod list_holds;
mod set_inventory;
mod show_data_dir;
mod show_inventory;
mod sweep_outbox;

pub use add_property::AddPropertyCommand;
pub use add_room_type::AddRoomTypeCommand;
pub use audit::AuditCommand;
pub use cancel_hold::CancelHoldCommand;
pub use convert_hold::ConvertHoldCommand;
pub use create_hold::CreateHoldCommand;
pub use expire_hold::{ExpireDueCommand, ExpireHoldCommand};
pub use init::InitCommand;
pub use list_events::ListEventsCommand;
pub use list_holds::ListHoldsCommand;
pub use set_inventory::SetInventoryCommand;
pub use show_data_dir::ShowDataDirCommand;
pub use show_inventory::ShowInventoryCommand;
pub use sweep_outbox::SweepOutboxCommand;

use clap::ValueEnum;
use innkeep::config::OutputFormat;
use innkeep::ResolvedConfig;

/// `--format` flag shared by the listing commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Human-readable columns.
    Table,
    /// One JSON document on stdout.
    Json,
}

/// The effective output format: flag beats configuration.
pub fn resolve_format(flag: Option<FormatArg>, config: &ResolvedConfig) -> OutputFormat {
    match flag {
        Some(FormatArg::Table) => OutputFormat::Table,
        Some(FormatArg::Json) => OutputFormat::Json,
        None => config.output_format,
    }
}
