use anyhow::Error;
use log::{error, info, warn};

use crate::config::Config;

pub mod driver;
pub mod pattern;
pub mod strip;
pub mod worker;

pub use pattern::Pattern;
pub use strip::Strip;
pub use worker::{LightHandle, LightWorker};

/// What the light worker can be asked to do
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LightCommand {
    /// Render a pattern on every strip
    Pattern(Pattern),
    /// Turn every pixel off
    Clear,
}

impl LightCommand {
    /// Pattern ids outside the table, and a missing id, clear the lights
    pub fn from_pattern_id(id: Option<usize>) -> Self {
        id.and_then(Pattern::from_id)
            .map_or(LightCommand::Clear, LightCommand::Pattern)
    }
}

/// Owns every strip and applies commands to all of them in order
pub struct LightController {
    strips: Vec<Strip>,
}

impl LightController {
    /// Open the hardware for every configured strip. Any failure here is
    /// fatal to startup.
    pub fn init(config: &Config) -> Result<Self, Error> {
        for skip in config.validate()? {
            warn!(
                "Strip {}: skip index {} is outside its {} pixels and will be ignored",
                skip.strip, skip.index, skip.count
            );
        }

        let mut strips = Vec::with_capacity(config.strips.len());
        for (i, strip) in config.strips.iter().enumerate() {
            info!(
                "Strip {} ({}): {} pixels on pin {} channel {}",
                i + 1,
                strip.name,
                strip.count,
                strip.pin,
                strip.channel
            );
            let driver = driver::open(&config.driver, strip)?;
            strips.push(Strip::new(&strip.name, strip.count, strip.skip.clone(), driver));
        }

        Ok(Self { strips })
    }

    pub fn from_strips(strips: Vec<Strip>) -> Self {
        Self { strips }
    }

    pub fn strips(&self) -> &[Strip] {
        &self.strips
    }

    pub fn execute(&mut self, command: LightCommand) -> Result<(), Error> {
        match command {
            LightCommand::Pattern(pattern) => self.apply_pattern(pattern),
            LightCommand::Clear => self.clear_all(),
        }
    }

    /// Render on every strip first, then mask and flush each one
    pub fn apply_pattern(&mut self, pattern: Pattern) -> Result<(), Error> {
        info!("Setting pattern {:?} on {} strips", pattern, self.strips.len());

        for strip in &mut self.strips {
            strip.render(pattern);
        }

        for strip in &mut self.strips {
            strip.apply_mask();
            strip.flush()?;
        }

        Ok(())
    }

    /// Blank and flush every strip. A strip that fails to flush does not stop
    /// the others; the first failure is returned.
    pub fn clear_all(&mut self) -> Result<(), Error> {
        info!("Clearing {} strips", self.strips.len());

        let mut result = Ok(());
        for strip in &mut self.strips {
            strip.fill(pattern::BLACK);
            if let Err(e) = strip.flush() {
                error!("{:#}", e);
                if result.is_ok() {
                    result = Err(e);
                }
            }
        }

        result
    }
}
