use clap::{Args, Subcommand};

use super::OutputFormat;
use foodstore::config::Config;

#[derive(Args)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show current configuration values
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl ConfigCommand {
    pub fn run(&self, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
        match &self.command {
            ConfigSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(config)?);
                    }
                    OutputFormat::Text => {
                        println!("Configuration");
                        println!("=============\n");

                        if let Some(path) = &config.config_file {
                            println!("Config file: {}", path.display());
                        } else {
                            println!(
                                "Config file: {} (not found)",
                                Config::default_config_path().display()
                            );
                        }
                        println!();

                        println!("database_path: {}", config.database_path.value.display());
                        println!("  source: {}", config.database_path.source);
                        println!();

                        println!("port: {}", config.port.value);
                        println!("  source: {}", config.port.source);
                        println!();

                        match &config.snapshot_path {
                            Some(snapshot) => {
                                println!("snapshot_path: {}", snapshot.value.display());
                                println!("  source: {}", snapshot.source);
                            }
                            None => println!("snapshot_path: (not set)"),
                        }
                        println!();

                        println!("sync_concurrency: {}", config.sync_concurrency.value);
                        println!("  source: {}", config.sync_concurrency.source);
                    }
                }
                Ok(())
            }
        }
    }
}
