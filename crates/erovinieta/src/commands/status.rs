//! One-shot handlers: current values and raw snapshot.

use erovinieta_core::Integration;

use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output;

pub fn handle_status(integration: &Integration, global: &GlobalOpts) -> Result<(), CliError> {
    let readings = integration.readings()?;
    let out = output::render_readings(
        &global.output,
        &readings,
        output::should_color(&global.color),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub fn handle_snapshot(integration: &Integration, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = integration.snapshot()?;
    let out = output::render_single(&global.output, snapshot.as_ref(), |s| {
        output::render_json(s, false)
    })?;
    output::print_output(&out, global.quiet);
    Ok(())
}
