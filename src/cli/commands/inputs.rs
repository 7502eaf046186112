use crate::config::AppConfig;
use crate::errors::AppResult;
use crate::types::InputNameResolver;
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
#[command(author, version, about, long_about = None)]
pub struct InputsCommand {
    /// Configuration file (defaults to ./config.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the effective configuration as TOML instead of the input table
    #[arg(long)]
    show_config: bool,
}

impl InputsCommand {
    pub fn run(&self) -> AppResult<()> {
        let config = AppConfig::load_from(self.config.as_deref())?;

        if self.show_config {
            print!("{}", config.to_toml()?);
            return Ok(());
        }

        let table = config.input_table()?;
        let reference = table.resolve_input_index(&config.inputs.reference_input);

        println!("{:>4}  {:<10}", "Bit", "Name");
        for (bit, name) in table.names().iter().enumerate() {
            let marker = if Some(bit) == reference {
                "  (reference)"
            } else {
                ""
            };
            println!("{:>4}  {:<10}{}", bit, name, marker);
        }
        if reference.is_none() {
            println!(
                "\nWarning: reference input '{}' is not in the table",
                config.inputs.reference_input
            );
        }
        Ok(())
    }
}
