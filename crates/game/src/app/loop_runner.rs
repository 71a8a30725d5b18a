use std::process::ExitCode;

use sands_engine::{run_app, Sandbox};
use tracing::{error, info};

use super::bootstrap::AppWiring;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let sandbox = match Sandbox::new(&app.layout, app.rng_seed) {
        Ok(sandbox) => sandbox,
        Err(err) => {
            error!(error = %err, "world_setup_failed");
            return ExitCode::FAILURE;
        }
    };
    info!(
        buildings = sandbox.buildings().len(),
        npcs = sandbox.npcs().len(),
        blocked_cells = sandbox.grid().blocked_cell_count(),
        "startup"
    );

    if let Err(err) = run_app(app.config, sandbox) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
