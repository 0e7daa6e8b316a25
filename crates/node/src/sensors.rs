//! The sensor rig: one `read_sample` per tick across all channels.
//!
//! `read_sample` never fails. The probe's transactional failure is encoded
//! in the returned sample; the analog channels always yield *a* value — a
//! floating input reads as noise, not as an error, and a bus fault falls
//! back to zero rather than aborting the tick.
//!
//! The `hw` feature gates the real MCP3008 + DHT11 rig; without it the rig
//! wraps the simulator.

use crate::config::Config;
use crate::sample::SensorSample;

#[cfg(feature = "hw")]
use crate::adc::Mcp3008;
#[cfg(feature = "hw")]
use crate::dht::Dht11;
#[cfg(feature = "hw")]
use crate::sample::ProbeStatus;

#[cfg(not(feature = "hw"))]
use crate::sim::{Scenario, SensorSim};

// ---------------------------------------------------------------------------
// Real rig (production — requires rppal + Raspberry Pi hardware)
// ---------------------------------------------------------------------------
#[cfg(feature = "hw")]
pub struct SensorRig {
    adc: Mcp3008,
    dht: Dht11,
    soil_channel: u8,
    light_channel: u8,
}

#[cfg(feature = "hw")]
impl SensorRig {
    pub fn new(cfg: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            adc: Mcp3008::new()?,
            dht: Dht11::new(cfg.dht_pin)?,
            soil_channel: cfg.soil_adc_channel,
            light_channel: cfg.light_adc_channel,
        })
    }

    /// Read all channels once. One attempt per channel, no retries.
    pub fn read_sample(&mut self) -> SensorSample {
        let soil_raw = self.read_analog(self.soil_channel, "soil");
        let light_raw = self.read_analog(self.light_channel, "light");

        let probe = match self.dht.read() {
            Ok(reading) => ProbeStatus::Ok(reading),
            Err(e) => {
                tracing::warn!("probe read failed: {e}");
                ProbeStatus::ReadFailure
            }
        };

        SensorSample::from_raw(soil_raw, light_raw, probe)
    }

    fn read_analog(&mut self, channel: u8, name: &str) -> u16 {
        match self.adc.read_channel(channel) {
            Ok(raw) => raw,
            Err(e) => {
                // The analog channels have no failure lane in the report;
                // a dead bus reads as zero.
                tracing::error!(channel, name, "adc read failed: {e}");
                0
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Simulated rig (development — no hardware)
// ---------------------------------------------------------------------------
#[cfg(not(feature = "hw"))]
pub struct SensorRig {
    sim: SensorSim,
}

#[cfg(not(feature = "hw"))]
impl SensorRig {
    pub fn new(_cfg: &Config) -> anyhow::Result<Self> {
        let scenario = Scenario::from_str_lossy(
            &std::env::var("SIM_SCENARIO").unwrap_or_default(),
        );
        let diurnal_s: f64 = std::env::var("SIM_DIURNAL_S")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(600.0);

        tracing::info!(%scenario, diurnal_s, "simulated sensor rig (no hardware)");
        Ok(Self {
            sim: SensorSim::new(scenario, diurnal_s),
        })
    }

    /// Read all channels once from the simulator.
    pub fn read_sample(&mut self) -> SensorSample {
        let soil_raw = self.sim.sample_soil();
        let light_raw = self.sim.sample_light();
        let probe = self.sim.sample_probe();
        SensorSample::from_raw(soil_raw, light_raw, probe)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
