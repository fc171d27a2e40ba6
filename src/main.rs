use kbd_backlight::{cycle, open_keyboard, StateTracker};

use log::{debug, error};
use std::process::ExitCode;

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let tracker = StateTracker::from_config_dir();
    debug!("state file: {:?}", tracker.path());

    match cycle(&tracker, open_keyboard) {
        Ok(report) => {
            debug!("{:?}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
