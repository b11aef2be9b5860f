//! Map screen window.
//!
//! Usage: `mapscreen [config.json]`. The configuration path can also be given in the
//! `MAPSCREEN_CONFIG` environment variable.

use mapscreen_egui::init::{init_logger, run, InitError};
use mapscreen_egui::AppConfig;

fn main() -> Result<(), InitError> {
    init_logger();

    let config = AppConfig::load(std::env::args())?;
    run(config)
}
