//! Castle Bats
//!
//! Headless session of the castle level: the hero follows a scripted key
//! sequence while three bats wander. Pass a `.toml` or `.ron` config path as
//! the first argument to override the defaults.

mod ai;
mod error;
mod game;
mod level;

use std::error::Error;

use castle_engine::core::config::{Config, GameConfig};
use castle_engine::foundation::logging;
use log::info;

use crate::error::GameError;
use crate::game::{demo_script, Game};
use crate::level::Level;

/// Upper bound on session length; the script quits earlier
const SESSION_SECONDS: f32 = 10.0;

fn load_config() -> Result<GameConfig, GameError> {
    let config = match std::env::args().nth(1) {
        Some(path) => GameConfig::load_from_file(path)?,
        None => GameConfig::default(),
    };
    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = load_config()?;
    logging::init_with_level(&config.engine.log_level);

    info!("Starting Castle Bats");
    let mut game = Game::new(config, Level::castle())?.with_script(demo_script());
    let summary = game.run(SESSION_SECONDS);

    info!(
        "Hero ended {:?} at {:?} after {} steps; {} bodies asleep, {} sounds",
        summary.hero_state,
        summary.hero_position,
        summary.steps,
        summary.sleeping,
        summary.sounds
    );
    Ok(())
}
