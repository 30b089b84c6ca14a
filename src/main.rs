use clap::Parser;
use droid_explorer::cli::commands::{cmd_check, cmd_explore};
use droid_explorer::cli::config::{Cli, Commands, load_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Explore {
            package,
            duration,
            output_dir,
            seed,
            save_ui_xml,
        } => {
            // CLI flags win over the config file's explore section.
            let duration = duration.unwrap_or(config.explore.duration_secs);
            cmd_explore(
                &package,
                duration,
                &output_dir,
                seed,
                save_ui_xml || config.explore.save_ui_xml,
                cli.serial.as_deref(),
                &config,
                cli.verbose,
            )?;
        }
        Commands::Check { package } => {
            let ok = cmd_check(&package, cli.serial.as_deref())?;
            if !ok {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
