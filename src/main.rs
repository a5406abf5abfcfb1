//! solprop - Main entry point

use clap::Parser;
use solprop::cli::{cmd_info, cmd_predict, cmd_train, Cli, Commands};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "solprop=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Train { data_dir, output } => {
            cmd_train(&data_dir, &output)?;
        }
        Commands::Predict {
            registry,
            solution,
            concentration,
            temperature,
            pressure,
            pressure_unit,
            density,
            vapor_unit,
        } => {
            cmd_predict(
                &registry,
                &solution,
                concentration,
                temperature,
                pressure,
                &pressure_unit,
                density,
                &vapor_unit,
            )?;
        }
        Commands::Info { registry } => {
            cmd_info(&registry)?;
        }
    }

    Ok(())
}
