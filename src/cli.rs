//! Command-line interface definitions

use clap::{Parser, Subcommand};

/// Browse and unlock LUKS-encrypted block devices
#[derive(Parser, Debug)]
#[command(name = "crypttui")]
#[command(about = "TUI for unlocking, mounting, and locking encrypted drives")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the encrypted devices and their states, then exit
    List {
        /// Emit the device list as JSON
        #[arg(long)]
        json: bool,
    },
}
