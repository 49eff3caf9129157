//! Hardware side of a strip.
//!
//! With the `pi` feature every strip gets its own ws281x controller. Without
//! it the frames are only logged, so the service can run on a laptop.

#[cfg(test)]
use std::sync::{Arc, Mutex};

use anyhow::Error;
use log::debug;
use smart_leds::RGB8;

use crate::config::{DriverConfig, StripConfig};

/// Transmits a full frame of colors to one physical strip
pub trait PixelDriver {
    fn show(&mut self, pixels: &[RGB8]) -> Result<(), Error>;
}

/// Open the driver for one strip
#[cfg(feature = "pi")]
pub fn open(driver: &DriverConfig, strip: &StripConfig) -> Result<Box<dyn PixelDriver>, Error> {
    Ok(Box::new(ws281x::Ws281xDriver::open(driver, strip)?))
}

#[cfg(not(feature = "pi"))]
pub fn open(_driver: &DriverConfig, strip: &StripConfig) -> Result<Box<dyn PixelDriver>, Error> {
    Ok(Box::new(SimulatedDriver::new(&strip.name)))
}

/// Logs frames instead of sending them anywhere
pub struct SimulatedDriver {
    name: String,
}

impl SimulatedDriver {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

impl PixelDriver for SimulatedDriver {
    fn show(&mut self, pixels: &[RGB8]) -> Result<(), Error> {
        let lit = pixels.iter().filter(|p| **p != RGB8::default()).count();
        debug!("{}: showing {} pixels, {} lit", self.name, pixels.len(), lit);
        Ok(())
    }
}

/// Keeps the last shown frame where a test can read it back
#[cfg(test)]
#[derive(Clone, Default)]
pub struct MemoryDriver {
    frames: Arc<Mutex<Vec<Vec<RGB8>>>>,
}

#[cfg(test)]
impl MemoryDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently shown frame, if any
    pub fn last_frame(&self) -> Option<Vec<RGB8>> {
        self.frames.lock().ok()?.last().cloned()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.lock().map(|f| f.len()).unwrap_or_default()
    }
}

#[cfg(test)]
impl PixelDriver for MemoryDriver {
    fn show(&mut self, pixels: &[RGB8]) -> Result<(), Error> {
        self.frames
            .lock()
            .map_err(|_| anyhow::anyhow!("frame log poisoned"))?
            .push(pixels.to_vec());
        Ok(())
    }
}

#[cfg(feature = "pi")]
mod ws281x {
    use anyhow::{anyhow, Error};
    use log::info;
    use rs_ws281x::{ChannelBuilder, Controller, ControllerBuilder, StripType as WsStripType};
    use smart_leds::RGB8;

    use super::PixelDriver;
    use crate::config::{DriverConfig, StripConfig, StripType};

    pub struct Ws281xDriver {
        controller: Controller,
        channel: usize,
    }

    impl Ws281xDriver {
        pub fn open(driver: &DriverConfig, strip: &StripConfig) -> Result<Self, Error> {
            info!(
                "{}: initializing {} pixels on pin {} channel {}",
                strip.name, strip.count, strip.pin, strip.channel
            );

            let count = i32::try_from(strip.count)?;
            let controller = ControllerBuilder::new()
                .freq(driver.frequency)
                .dma(driver.dma)
                .channel(
                    strip.channel,
                    ChannelBuilder::new()
                        .pin(strip.pin)
                        .count(count)
                        .strip_type(strip_type(driver.strip_type))
                        .brightness(driver.brightness)
                        .invert(driver.invert)
                        .build(),
                )
                .build()
                .map_err(|e| anyhow!("{}: ws281x init failed: {:?}", strip.name, e))?;

            Ok(Self {
                controller,
                channel: strip.channel,
            })
        }
    }

    impl PixelDriver for Ws281xDriver {
        fn show(&mut self, pixels: &[RGB8]) -> Result<(), Error> {
            // Raw colors are stored as 0xWWRRGGBB little endian
            for (led, color) in self.controller.leds_mut(self.channel).iter_mut().zip(pixels) {
                *led = [color.b, color.g, color.r, 0];
            }
            self.controller
                .render()
                .map_err(|e| anyhow!("ws281x render failed: {:?}", e))
        }
    }

    fn strip_type(strip_type: StripType) -> WsStripType {
        match strip_type {
            StripType::Rgb => WsStripType::Ws2811Rgb,
            StripType::Rbg => WsStripType::Ws2811Rbg,
            StripType::Grb => WsStripType::Ws2811Grb,
            StripType::Gbr => WsStripType::Ws2811Gbr,
            StripType::Brg => WsStripType::Ws2811Brg,
            StripType::Bgr => WsStripType::Ws2811Bgr,
        }
    }
}
