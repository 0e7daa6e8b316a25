//! Stateful sensor simulator for running the node without hardware.
//!
//! Models the full rig in the 10-bit raw domain:
//! - Soil moisture: random walk with mean reversion plus a slow drying
//!   drift (drier = higher raw), ADC noise, occasional spikes
//! - Light: diurnal sinusoid plus noise
//! - Probe: gentle random walks around room values, with a per-scenario
//!   probability that a read transaction fails

use std::fmt;

use crate::sample::{ProbeReading, ProbeStatus, RAW_MAX};

// ---------------------------------------------------------------------------
// Gaussian approximation (no extra dependency)
// ---------------------------------------------------------------------------

/// Approximate a sample from N(0,1) using the Irwin-Hall method:
/// sum of 12 uniform [0,1) values minus 6.
fn approx_std_normal() -> f64 {
    let mut sum: f64 = 0.0;
    for _ in 0..12 {
        sum += fastrand::f64();
    }
    sum - 6.0
}

/// Sample from N(mean, sigma).
fn gaussian(mean: f64, sigma: f64) -> f64 {
    mean + sigma * approx_std_normal()
}

// ---------------------------------------------------------------------------
// Scenario presets
// ---------------------------------------------------------------------------

/// Pre-configured simulation profiles selectable via `SIM_SCENARIO` env var.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Starts mid-range, slow drift toward dry. Moderate noise, rare probe
    /// failures. Realistic steady-state for a warm day.
    Drying,
    /// Hovers near the centre, low noise, probe never fails. Good for
    /// watching clean output.
    Stable,
    /// High noise, frequent spikes, ~15 % probe failure rate. Exercises the
    /// error line and fault blink pattern without touching the wiring.
    Flaky,
    /// Starts near the wet end, very slow drying.
    Wet,
}

impl Scenario {
    pub fn from_str_lossy(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "stable" => Self::Stable,
            "flaky" => Self::Flaky,
            "wet" => Self::Wet,
            _ => Self::Drying, // default
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Drying => write!(f, "drying"),
            Self::Stable => write!(f, "stable"),
            Self::Flaky => write!(f, "flaky"),
            Self::Wet => write!(f, "wet"),
        }
    }
}

// ---------------------------------------------------------------------------
// Main simulator
// ---------------------------------------------------------------------------

/// Stateful simulator producing one full rig reading per call.
pub struct SensorSim {
    // Soil random walk ("true" moisture in raw units; higher = drier)
    soil_base: f64,
    drift_per_sample: f64,
    walk_sigma: f64,
    mean_reversion: f64,
    center: f64,
    noise_sigma: f64,
    spike_prob: f32,
    spike_sigma: f64,

    // Light diurnal cycle
    diurnal_period_s: f64,

    // Probe state
    temperature_c: f64,
    humidity: f64,
    probe_fail_prob: f32,
}

impl SensorSim {
    /// Create a simulator for `scenario`.
    ///
    /// `diurnal_period_s` controls the day/night light cycle length. Use 600
    /// (10 min) for fast dev iteration or 86400 for real-time.
    pub fn new(scenario: Scenario, diurnal_period_s: f64) -> Self {
        let full = f64::from(RAW_MAX);

        // start_frac: 0.0 = wettest (raw 0), 1.0 = driest (raw 1023)
        let (drift, walk_sigma, mean_rev, noise_sigma, spike_prob, spike_sigma, start_frac, fail) =
            match scenario {
                Scenario::Drying => (1.0, 10.0, 0.02, 5.0, 0.03_f32, 120.0, 0.5, 0.01_f32),
                Scenario::Stable => (0.1, 4.0, 0.05, 2.0, 0.005, 60.0, 0.5, 0.0),
                Scenario::Flaky => (0.7, 18.0, 0.02, 14.0, 0.10, 200.0, 0.5, 0.15),
                Scenario::Wet => (0.2, 5.0, 0.02, 4.0, 0.02, 90.0, 0.2, 0.01),
            };

        Self {
            soil_base: start_frac * full,
            drift_per_sample: drift,
            walk_sigma,
            mean_reversion: mean_rev,
            center: full / 2.0,
            noise_sigma,
            spike_prob,
            spike_sigma,
            diurnal_period_s,
            temperature_c: 21.0,
            humidity: 60.0,
            probe_fail_prob: fail,
        }
    }

    /// Produce the next raw soil moisture reading (0–1023, higher = drier).
    ///
    /// The internal base evolves with each call, so call once per tick.
    pub fn sample_soil(&mut self) -> u16 {
        let full = f64::from(RAW_MAX);

        let pull = self.mean_reversion * (self.center - self.soil_base);
        let walk = gaussian(0.0, self.walk_sigma);
        self.soil_base =
            (self.soil_base + self.drift_per_sample + pull + walk).clamp(0.0, full);

        let noise = gaussian(0.0, self.noise_sigma);
        let spike = if fastrand::f32() < self.spike_prob {
            gaussian(0.0, self.spike_sigma)
        } else {
            0.0
        };

        (self.soil_base + noise + spike).round().clamp(0.0, full) as u16
    }

    /// Produce the next raw light reading (0–1023), following a sinusoidal
    /// day/night cycle with noise.
    pub fn sample_light(&mut self) -> u16 {
        let full = f64::from(RAW_MAX);

        let now_s = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs_f64();
        let phase = 2.0 * std::f64::consts::PI * now_s / self.diurnal_period_s;

        // Half-sine day, dark night, centred so midday peaks near full scale.
        let daylight = phase.sin().max(0.0) * full * 0.9;
        let noise = gaussian(0.0, self.noise_sigma);

        (daylight + noise).round().clamp(0.0, full) as u16
    }

    /// Simulate one probe transaction: either a reading near the current
    /// walk state or a read failure, per the scenario's failure rate.
    pub fn sample_probe(&mut self) -> ProbeStatus {
        if fastrand::f32() < self.probe_fail_prob {
            return ProbeStatus::ReadFailure;
        }

        self.temperature_c = (self.temperature_c + gaussian(0.0, 0.1)).clamp(5.0, 45.0);
        self.humidity = (self.humidity + gaussian(0.0, 0.3)).clamp(20.0, 95.0);

        ProbeStatus::Ok(ProbeReading {
            temperature_c: self.temperature_c as f32,
            humidity: self.humidity as f32,
        })
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn soil_readings_within_raw_range() {
        let mut sim = SensorSim::new(Scenario::Flaky, 600.0);
        for _ in 0..500 {
            let v = sim.sample_soil();
            assert!(v <= RAW_MAX, "soil raw out of range: {v}");
        }
    }

    #[test]
    fn light_readings_within_raw_range() {
        let mut sim = SensorSim::new(Scenario::Drying, 600.0);
        for _ in 0..500 {
            let v = sim.sample_light();
            assert!(v <= RAW_MAX, "light raw out of range: {v}");
        }
    }

    #[test]
    fn soil_temporal_coherence() {
        // Consecutive readings should be much closer than the full range.
        let mut sim = SensorSim::new(Scenario::Stable, 600.0);
        let samples: Vec<i32> = (0..100).map(|_| i32::from(sim.sample_soil())).collect();
        let max_jump = samples
            .windows(2)
            .map(|w| (w[1] - w[0]).abs())
            .max()
            .unwrap();
        // Stable scenario: allow headroom for rare spikes but stay well
        // under full scale.
        assert!(max_jump < 400, "max consecutive jump too large: {max_jump}");
    }

    #[test]
    fn stable_probe_never_fails() {
        let mut sim = SensorSim::new(Scenario::Stable, 600.0);
        for _ in 0..200 {
            assert!(matches!(sim.sample_probe(), ProbeStatus::Ok(_)));
        }
    }

    #[test]
    fn flaky_probe_fails_sometimes() {
        let mut sim = SensorSim::new(Scenario::Flaky, 600.0);
        let failures = (0..500)
            .filter(|_| matches!(sim.sample_probe(), ProbeStatus::ReadFailure))
            .count();
        // 15 % rate over 500 draws; zero failures is astronomically unlikely.
        assert!(failures > 0, "flaky scenario should produce probe failures");
    }

    #[test]
    fn probe_values_stay_plausible() {
        let mut sim = SensorSim::new(Scenario::Drying, 600.0);
        for _ in 0..300 {
            if let ProbeStatus::Ok(r) = sim.sample_probe() {
                assert!((5.0..=45.0).contains(&r.temperature_c), "temp {}", r.temperature_c);
                assert!((20.0..=95.0).contains(&r.humidity), "humidity {}", r.humidity);
            }
        }
    }

    #[test]
    fn wet_scenario_starts_low() {
        // Wet scenario starts near the wet end (low raw values).
        let mut sim = SensorSim::new(Scenario::Wet, 600.0);
        let avg: f64 = (0..10).map(|_| f64::from(sim.sample_soil())).sum::<f64>() / 10.0;
        assert!(avg < f64::from(RAW_MAX) / 2.0, "wet scenario avg too high: {avg:.0}");
    }

    #[test]
    fn scenario_from_str_lossy() {
        assert_eq!(Scenario::from_str_lossy("drying"), Scenario::Drying);
        assert_eq!(Scenario::from_str_lossy("STABLE"), Scenario::Stable);
        assert_eq!(Scenario::from_str_lossy("Flaky"), Scenario::Flaky);
        assert_eq!(Scenario::from_str_lossy("wet"), Scenario::Wet);
        assert_eq!(Scenario::from_str_lossy("unknown"), Scenario::Drying);
        assert_eq!(Scenario::from_str_lossy(""), Scenario::Drying);
    }

    #[test]
    fn scenario_display() {
        assert_eq!(Scenario::Drying.to_string(), "drying");
        assert_eq!(Scenario::Stable.to_string(), "stable");
        assert_eq!(Scenario::Flaky.to_string(), "flaky");
        assert_eq!(Scenario::Wet.to_string(), "wet");
    }

    #[test]
    fn approx_std_normal_has_zero_mean() {
        let n = 5000;
        let sum: f64 = (0..n).map(|_| approx_std_normal()).sum();
        let mean = sum / f64::from(n);
        assert!(
            mean.abs() < 0.15,
            "approx_std_normal mean should be near zero: {mean}"
        );
    }
}
