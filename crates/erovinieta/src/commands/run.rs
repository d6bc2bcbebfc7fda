//! Continuous polling: print values after every published snapshot.

use chrono::Local;
use tracing::{debug, info};

use erovinieta_core::Integration;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub async fn handle(integration: &Integration, global: &GlobalOpts) -> Result<(), CliError> {
    let color = output::should_color(&global.color);
    let mut published = integration.coordinator().subscribe();

    print_readings(integration, global, color)?;
    info!(
        interval_secs = integration.coordinator().options().update_interval.as_secs(),
        "polling, press Ctrl-C to stop"
    );

    loop {
        tokio::select! {
            result = tokio::signal::ctrl_c() => {
                result?;
                debug!("interrupt received");
                break;
            }
            changed = published.changed() => {
                if changed.is_err() {
                    break;
                }
                print_readings(integration, global, color)?;
            }
        }
    }
    Ok(())
}

fn print_readings(
    integration: &Integration,
    global: &GlobalOpts,
    color: bool,
) -> Result<(), CliError> {
    let readings = integration.readings()?;
    if !global.quiet {
        eprintln!("── {} ──", Local::now().format("%Y-%m-%d %H:%M:%S"));
    }
    let out = output::render_readings(&global.output, &readings, color)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
