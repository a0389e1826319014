//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::commands;

/// Hold and inventory engine for lodging properties.
#[derive(Debug, Parser)]
#[command(name = "innkeep", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Data directory (defaults to ~/.innkeep)
    #[arg(long, global = true, env = "INNKEEP_DATA_DIR", value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Database busy timeout in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub busy_timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Initialize the data directory and database
    Init(commands::InitCommand),

    /// Create a property
    AddProperty(commands::AddPropertyCommand),

    /// Create a room type within a property
    AddRoomType(commands::AddRoomTypeCommand),

    /// Set nightly capacity for a room type over a date range
    SetInventory(commands::SetInventoryCommand),

    /// Show nightly inventory counters
    ShowInventory(commands::ShowInventoryCommand),

    /// Place a hold on inventory for a stay
    CreateHold(commands::CreateHoldCommand),

    /// Expire a hold whose TTL has lapsed
    ExpireHold(commands::ExpireHoldCommand),

    /// Expire every hold that is past its TTL
    ExpireDue(commands::ExpireDueCommand),

    /// Cancel an active hold
    CancelHold(commands::CancelHoldCommand),

    /// Convert a paid hold into a reservation
    ConvertHold(commands::ConvertHoldCommand),

    /// List a property's holds
    ListHolds(commands::ListHoldsCommand),

    /// List a property's outbox events
    ListEvents(commands::ListEventsCommand),

    /// Check the inventory ledger against the hold rows
    Audit(commands::AuditCommand),

    /// Delete outbox events older than the retention window
    SweepOutbox(commands::SweepOutboxCommand),

    /// Print the effective data directory
    ShowDataDir(commands::ShowDataDirCommand),
}
