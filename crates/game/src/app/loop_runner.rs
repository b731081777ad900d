use std::process::ExitCode;

use scroll_engine::run_app;
use tracing::error;

use super::bootstrap::AppWiring;
use super::gameplay::Hero;

pub(crate) fn run(app: AppWiring) -> ExitCode {
    if let Err(err) = run_app::<Hero, _>(app.config, app.sim_config, app.levels) {
        error!(error = %err, "startup_failed");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}
