//! One tick's worth of sensor data, normalised for reporting.
//!
//! A `SensorSample` lives for exactly one loop iteration: built by the
//! sensor rig, consumed by the reporter, dropped before the next tick.
//! No history is kept and no smoothing happens across samples.

/// Full-scale value of the 10-bit analog channels.
pub const RAW_MAX: u16 = 1023;

/// Outcome of the combined temperature/humidity probe read.
///
/// The probe is transactional — checksum mismatch, timeout, and wiring
/// faults all collapse into `ReadFailure`. Temperature and humidity exist
/// only on the `Ok` arm, so a failed read cannot leak stale values into
/// the report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeStatus {
    Ok(ProbeReading),
    ReadFailure,
}

/// Last-read values from a successful probe transaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeReading {
    pub temperature_c: f32,
    pub humidity: f32,
}

/// A single normalised reading of all channels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorSample {
    /// Raw soil moisture ADC value. Higher = drier.
    pub soil_raw: u16,
    /// Soil moisture in percent, inverse-linear from `soil_raw`.
    pub soil_percent: f64,
    /// Raw light ADC value.
    pub light_raw: u16,
    /// Light level in percent, direct-linear from `light_raw`.
    pub light_percent: f64,
    pub probe: ProbeStatus,
}

impl SensorSample {
    /// Build a sample from raw channel values, applying the percent
    /// mappings. `probe` is passed through as read.
    pub fn from_raw(soil_raw: u16, light_raw: u16, probe: ProbeStatus) -> Self {
        Self {
            soil_raw,
            soil_percent: soil_percent(soil_raw),
            light_raw,
            light_percent: light_percent(light_raw),
            probe,
        }
    }
}

/// Inverse-linear mapping: raw 1023 (bone dry) → 0 %, raw 0 (soaked) → 100 %.
///
/// Analog noise can push a reading past full scale, so the raw value is
/// clamped before mapping.
pub fn soil_percent(raw: u16) -> f64 {
    let raw = raw.min(RAW_MAX);
    (RAW_MAX - raw) as f64 / RAW_MAX as f64 * 100.0
}

/// Direct-linear mapping: raw 0 → 0 %, raw 1023 → 100 %. Clamped like
/// `soil_percent`.
pub fn light_percent(raw: u16) -> f64 {
    let raw = raw.min(RAW_MAX);
    raw as f64 / RAW_MAX as f64 * 100.0
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    // -- Range invariant ------------------------------------------------------

    #[test]
    fn percent_mappings_stay_in_range() {
        for raw in 0..=RAW_MAX {
            let s = soil_percent(raw);
            let l = light_percent(raw);
            assert!((0.0..=100.0).contains(&s), "soil out of range at raw={raw}: {s}");
            assert!((0.0..=100.0).contains(&l), "light out of range at raw={raw}: {l}");
        }
    }

    #[test]
    fn soil_boundaries() {
        assert_eq!(soil_percent(RAW_MAX), 0.0);
        assert_eq!(soil_percent(0), 100.0);
    }

    #[test]
    fn light_boundaries() {
        assert_eq!(light_percent(0), 0.0);
        assert_eq!(light_percent(RAW_MAX), 100.0);
    }

    #[test]
    fn out_of_scale_raw_is_clamped() {
        // Noise can exceed nominal full scale; the mapping must not go
        // negative or above 100.
        assert_eq!(soil_percent(u16::MAX), 0.0);
        assert_eq!(light_percent(u16::MAX), 100.0);
    }

    #[test]
    fn soil_mapping_is_inverse() {
        assert!(soil_percent(200) > soil_percent(800), "drier soil must read lower");
    }

    // -- Worked values from the original wiring -------------------------------

    #[test]
    fn known_raw_values_map_as_expected() {
        // raw=300 → (1023-300)/1023*100 ≈ 70.67..., rendered later as 70.7
        assert!((soil_percent(300) - 70.674).abs() < 0.01);
        // raw=800 → 800/1023*100 ≈ 78.20...
        assert!((light_percent(800) - 78.201).abs() < 0.01);
    }

    // -- Sample construction --------------------------------------------------

    #[test]
    fn from_raw_fills_percent_fields() {
        let s = SensorSample::from_raw(RAW_MAX, 0, ProbeStatus::ReadFailure);
        assert_eq!(s.soil_raw, RAW_MAX);
        assert_eq!(s.soil_percent, 0.0);
        assert_eq!(s.light_raw, 0);
        assert_eq!(s.light_percent, 0.0);
        assert_eq!(s.probe, ProbeStatus::ReadFailure);
    }

    #[test]
    fn probe_values_only_exist_on_ok() {
        let ok = SensorSample::from_raw(
            500,
            500,
            ProbeStatus::Ok(ProbeReading {
                temperature_c: 21.5,
                humidity: 60.25,
            }),
        );
        match ok.probe {
            ProbeStatus::Ok(r) => {
                assert_eq!(r.temperature_c, 21.5);
                assert_eq!(r.humidity, 60.25);
            }
            ProbeStatus::ReadFailure => panic!("expected Ok"),
        }
    }
}
