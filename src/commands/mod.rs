mod config_cmd;
mod list;
mod sync_cmd;

pub use config_cmd::ConfigCommand;
pub use list::ListCommand;
pub use sync_cmd::SyncCommand;

use clap::ValueEnum;

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}
