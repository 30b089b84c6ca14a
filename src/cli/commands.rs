use std::path::PathBuf;
use std::time::Duration;

use crate::cli::config::AppConfig;
use crate::device::adb::AdbChannel;
use crate::device::channel::DeviceChannel;
use crate::{ExploreOptions, run_exploration};

// ============================================================================
// explore subcommand
// ============================================================================

pub fn cmd_explore(
    package: &str,
    duration_secs: u64,
    output_dir: &str,
    seed: u64,
    save_ui_xml: bool,
    serial: Option<&str>,
    config: &AppConfig,
    verbose: u8,
) -> Result<(), Box<dyn std::error::Error>> {
    let opts = ExploreOptions {
        package: package.to_string(),
        duration: Duration::from_secs(duration_secs),
        output_dir: PathBuf::from(output_dir).join(package),
        seed,
        save_ui_xml,
        serial: serial.map(|s| s.to_string()),
        vision_endpoint: config.vision.endpoint.clone(),
        agent_program: config.agent.program.clone(),
        agent_args: config.agent.args.clone(),
        verbose,
    };

    let summary = run_exploration(&opts)?;

    println!(
        "Artifacts written to {}/ (activities: {}, tabs: {}/{})",
        opts.output_dir.display(),
        summary.coverage.activities.len(),
        summary.coverage.nav_tabs_visited,
        summary.coverage.nav_tabs_detected
    );
    Ok(())
}

// ============================================================================
// check subcommand
// ============================================================================

/// Probe the device and target app; returns whether both are usable.
pub fn cmd_check(package: &str, serial: Option<&str>) -> Result<bool, Box<dyn std::error::Error>> {
    let mut device = AdbChannel::new(serial.map(|s| s.to_string()));
    device.probe()?;
    println!("Device reachable.");

    let (w, h) = device.screen_size()?;
    println!("Screen: {}x{}", w, h);

    let installed = device.package_installed(package)?;
    if installed {
        println!("Package {} is installed.", package);
    } else {
        eprintln!("Package {} is NOT installed.", package);
    }
    Ok(installed)
}
