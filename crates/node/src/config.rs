//! TOML config file loading and validation for the wiring and tick timing.
//!
//! The node is meant to be flashed-and-forgotten: configuration is read once
//! at startup and never reloaded. A missing file is not an error — defaults
//! replicate the reference wiring.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::time::Duration;

// ---------------------------------------------------------------------------
// Config file structure
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Digital presence output of the soil sensor board. Wired and listed in
    /// the banner, but never sampled — the analog channel carries all the
    /// information this comparator output thresholds.
    pub soil_digital_pin: u8,
    /// MCP3008 channel of the soil moisture analog output.
    pub soil_adc_channel: u8,
    /// MCP3008 channel of the LDR divider.
    pub light_adc_channel: u8,
    /// GPIO line of the DHT11 data pin.
    pub dht_pin: u8,
    /// GPIO line of the status LED.
    pub led_pin: u8,
    /// Nominal tick interval. Pulse and read time is not subtracted, so the
    /// actual period runs slightly above this.
    pub interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            soil_digital_pin: 8,
            soil_adc_channel: 0,
            light_adc_channel: 1,
            dht_pin: 3,
            led_pin: 13,
            interval_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// GPIO whitelist
// ---------------------------------------------------------------------------

/// BCM GPIO pins available on the Raspberry Pi 40-pin header for general
/// use. GPIO 0-1 are reserved for the ID EEPROM and must never be used.
/// GPIO 28+ are not exposed on the standard header.
const VALID_GPIO_PINS: &[u8] = &[
    2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16, 17, 18, 19, 20, 21, 22, 23, 24, 25, 26, 27,
];

/// Highest single-ended channel on the MCP3008. Lives here rather than in
/// the driver module because the driver is only compiled for `hw` and test
/// builds, while validation always needs the bound.
pub const MAX_ADC_CHANNEL: u8 = 7;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

impl Config {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Validate all entries. Returns `Ok(())` or an error describing every
    /// violation found (not just the first one).
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        for (name, pin) in [
            ("soil_digital_pin", self.soil_digital_pin),
            ("dht_pin", self.dht_pin),
            ("led_pin", self.led_pin),
        ] {
            if !VALID_GPIO_PINS.contains(&pin) {
                errors.push(format!(
                    "{name}: {pin} is not a valid BCM GPIO pin (allowed: 2-27)"
                ));
            }
        }

        if self.soil_digital_pin == self.dht_pin {
            errors.push(format!(
                "soil_digital_pin and dht_pin both set to {}",
                self.dht_pin
            ));
        }
        if self.led_pin == self.dht_pin {
            errors.push(format!("led_pin and dht_pin both set to {}", self.led_pin));
        }
        if self.led_pin == self.soil_digital_pin {
            errors.push(format!(
                "led_pin and soil_digital_pin both set to {}",
                self.led_pin
            ));
        }

        for (name, ch) in [
            ("soil_adc_channel", self.soil_adc_channel),
            ("light_adc_channel", self.light_adc_channel),
        ] {
            if ch > MAX_ADC_CHANNEL {
                errors.push(format!(
                    "{name}: channel {ch} exceeds maximum ({MAX_ADC_CHANNEL})"
                ));
            }
        }

        if self.soil_adc_channel == self.light_adc_channel {
            errors.push(format!(
                "soil_adc_channel and light_adc_channel both set to {}",
                self.soil_adc_channel
            ));
        }

        if self.interval_ms == 0 {
            errors.push("interval_ms must be positive".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            bail!(
                "config validation failed ({} error{}):\n  - {}",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" },
                errors.join("\n  - ")
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Read, parse, and validate a TOML config file. Falls back to the default
/// wiring when the file does not exist.
pub fn load(path: &str) -> Result<Config> {
    let config = match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {path}"))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path, "config file not found, using default wiring");
            Config::default()
        }
        Err(e) => return Err(e).with_context(|| format!("failed to read config: {path}")),
    };

    config
        .validate()
        .with_context(|| format!("invalid config: {path}"))?;
    Ok(config)
}

// ===========================================================================
// Tests
// ===========================================================================
