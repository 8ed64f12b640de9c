//! `mortar config`: inspect the resolved configuration.

use crate::{cli::ConfigCommands, config::AppConfig, error::CliResult, output::OutputManager};

pub fn execute(cmd: ConfigCommands, config: AppConfig, output: OutputManager) -> CliResult<()> {
    match cmd {
        ConfigCommands::Get { key } => {
            let value = config.get(&key)?;
            output.print(&value)?;
        }
        ConfigCommands::List => {
            output.header("Current Configuration:")?;
            output.print(&config.to_toml()?)?;
        }
        ConfigCommands::Path => {
            output.print(&AppConfig::config_path().display().to_string())?;
        }
    }
    Ok(())
}
