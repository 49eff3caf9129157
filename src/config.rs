use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Error};
use log::info;
use serde::{Deserialize, Serialize};

/// Environment variable naming the RON config file.
pub const CONFIG_ENV: &str = "PIGHTS_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.ron";

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub driver: DriverConfig,
    pub strips: Vec<StripConfig>,
    pub http: HttpConfig,
    /// Seconds between liveness log lines
    pub liveness_interval_secs: u64,
    /// Append log output to this file instead of stderr
    pub log_file: Option<PathBuf>,
}

/// Signal parameters shared by every strip
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DriverConfig {
    /// LED signal frequency in hertz (usually 800khz)
    pub frequency: u32,
    /// DMA channel used to generate the signal
    pub dma: i32,
    /// 0 is darkest, 255 is brightest
    pub brightness: u8,
    /// Invert the signal (when using an NPN transistor level shift)
    pub invert: bool,
    pub strip_type: StripType,
}

/// Color ordering expected on the wire
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum StripType {
    Rgb,
    Rbg,
    Grb,
    Gbr,
    Brg,
    Bgr,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct StripConfig {
    pub name: String,
    pub count: usize,
    pub pin: i32,
    pub channel: usize,
    /// Pixels that are forced off after every pattern
    #[serde(default)]
    pub skip: Vec<usize>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct HttpConfig {
    pub address: String,
    pub port: u16,
}

/// A skip-list entry that does not address a pixel of its strip
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutOfRangeSkip {
    pub strip: String,
    pub index: usize,
    pub count: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            frequency: 800_000,
            dma: 10,
            brightness: 200,
            invert: false,
            strip_type: StripType::Grb,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            address: "0.0.0.0".to_string(),
            port: 80,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            driver: DriverConfig::default(),
            strips: vec![
                StripConfig {
                    name: "Roof".to_string(),
                    count: 51,
                    pin: 18,
                    channel: 0,
                    skip: vec![0, 30, 51],
                },
                StripConfig {
                    name: "West / Garage".to_string(),
                    count: 135,
                    pin: 19,
                    channel: 1,
                    skip: vec![19, 48, 87, 88, 89],
                },
                StripConfig {
                    name: "East / Office".to_string(),
                    count: 99,
                    pin: 21,
                    channel: 0,
                    skip: vec![16, 45, 57, 58, 59, 60, 61, 62, 63, 64, 65, 96, 97, 98, 99],
                },
            ],
            http: HttpConfig::default(),
            liveness_interval_secs: 10,
            log_file: None,
        }
    }
}

impl Config {
    /// Load the config named by `PIGHTS_CONFIG`, or `config.ron` in the
    /// working directory. A missing file means the built-in defaults.
    pub fn load() -> Result<Config, Error> {
        let path = std::env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Config, Error> {
        if !path.exists() {
            info!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let config = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_ron(&config).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn from_ron(config: &str) -> Result<Config, Error> {
        let config: Config = ron::from_str(config)?;
        Ok(config)
    }

    /// Reject topologies the light worker cannot drive and report skip-list
    /// entries that will be ignored.
    pub fn validate(&self) -> Result<Vec<OutOfRangeSkip>, Error> {
        if self.strips.is_empty() {
            bail!("no strips configured");
        }

        let mut out_of_range = Vec::new();
        for strip in &self.strips {
            if strip.count == 0 {
                bail!("strip {:?} has no pixels", strip.name);
            }
            if strip.channel > 1 {
                bail!("strip {:?} uses channel {}, only 0 and 1 exist", strip.name, strip.channel);
            }
            out_of_range.extend(strip.skip.iter().filter(|&&i| i >= strip.count).map(|&index| {
                OutOfRangeSkip {
                    strip: strip.name.clone(),
                    index,
                    count: strip.count,
                }
            }));
        }

        Ok(out_of_range)
    }

    pub fn liveness_interval(&self) -> Duration {
        Duration::from_secs(self.liveness_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load() {
        let path = std::env::temp_dir().join(format!("pights-config-{}.ron", std::process::id()));
        std::fs::write(
            &path,
            r#"(
    strips: [
        StripConfig(
            name: "Porch",
            count: 10,
            pin: 18,
            channel: 0,
            skip: [3],
        ),
    ],
    http: HttpConfig(port: 8080),
)"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(
            config.strips,
            vec![StripConfig {
                name: "Porch".to_string(),
                count: 10,
                pin: 18,
                channel: 0,
                skip: vec![3],
            }]
        );
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.http.address, "0.0.0.0");
        assert_eq!(config.driver, DriverConfig::default());
    }

    #[test]
    fn missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("pights-config-does-not-exist.ron");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn defaults_match_the_installation() {
        let config = Config::default();
        let counts: Vec<_> = config.strips.iter().map(|s| s.count).collect();
        assert_eq!(counts, vec![51, 135, 99]);
        assert_eq!(config.http.port, 80);
        assert_eq!(config.driver.frequency, 800_000);
        assert_eq!(config.driver.strip_type, StripType::Grb);
    }

    #[test]
    fn validate_reports_one_past_end_skips() {
        let out_of_range = Config::default().validate().unwrap();
        assert_eq!(
            out_of_range,
            vec![
                OutOfRangeSkip {
                    strip: "Roof".to_string(),
                    index: 51,
                    count: 51
                },
                OutOfRangeSkip {
                    strip: "East / Office".to_string(),
                    index: 99,
                    count: 99
                },
            ]
        );
    }

    #[test]
    fn validate_rejects_empty_strip() {
        let mut config = Config::default();
        config.strips[1].count = 0;
        assert!(config.validate().is_err());

        config.strips.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn bad_ron_is_an_error() {
        assert!(Config::from_ron("(strips: 5)").is_err());
    }
}
