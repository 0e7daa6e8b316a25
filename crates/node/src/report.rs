//! Status line rendering and emission.
//!
//! The wire format is the fixed schema the backend's serial reader parses:
//! one JSON object per line, keys in a fixed order, numbers rendered at a
//! fixed precision. It is rendered by hand rather than through a serializer
//! because the consumer contract pins the exact fraction digits
//! (`21 → "21.00"`, `50 → "50.0"`), which floating-point serializers do not
//! guarantee.

use std::io::Write;

use crate::config::Config;
use crate::indicator::{StatusLed, TICK_FAULT, TICK_OK};
use crate::sample::{ProbeStatus, SensorSample};

/// Error line emitted when the probe transaction fails. Fixed literal; no
/// sensor fields accompany it.
pub const PROBE_ERROR_LINE: &str = r#"{"erro":"Falha na leitura do DHT11"}"#;

/// Render the status line for one sample.
///
/// Temperature and air humidity carry 2 fraction digits, soil and light
/// percentages carry 1. Key names and order are part of the contract.
pub fn render_line(sample: &SensorSample) -> String {
    match sample.probe {
        ProbeStatus::Ok(probe) => format!(
            "{{\"temperatura\":{:.2},\"umidade_ar\":{:.2},\"umidade_solo\":{:.1},\"luminosidade\":{:.1}}}",
            probe.temperature_c, probe.humidity, sample.soil_percent, sample.light_percent,
        ),
        ProbeStatus::ReadFailure => PROBE_ERROR_LINE.to_string(),
    }
}

/// Writes exactly one status line per tick to the byte sink and drives the
/// matching LED blink code.
pub struct StatusReporter<W: Write> {
    sink: W,
}

impl<W: Write> StatusReporter<W> {
    pub fn new(sink: W) -> Self {
        Self { sink }
    }

    /// Emit the line for `sample`, then blink the matching code.
    ///
    /// Writes are fire-and-forget: the consumer sends no acknowledgment and
    /// a sink error does not abort the loop — the caller logs it and moves
    /// on to the next tick.
    pub fn report(&mut self, sample: &SensorSample, led: &mut StatusLed) -> anyhow::Result<()> {
        writeln!(self.sink, "{}", render_line(sample))?;
        self.sink.flush()?;

        match sample.probe {
            ProbeStatus::Ok(_) => led.pulse(TICK_OK),
            ProbeStatus::ReadFailure => led.pulse(TICK_FAULT),
        }
        Ok(())
    }

    /// Write the one-time startup banner describing the wiring. Purely
    /// informational, not machine-parseable.
    pub fn banner(&mut self, cfg: &Config) -> anyhow::Result<()> {
        writeln!(self.sink, "======================================")?;
        writeln!(self.sink, "Iniciando leitura dos sensores...")?;
        writeln!(self.sink, "Sensores conectados:")?;
        writeln!(
            self.sink,
            "- Umidade do solo (pino {} e canal A{})",
            cfg.soil_digital_pin, cfg.soil_adc_channel
        )?;
        writeln!(self.sink, "- Luminosidade (canal A{})", cfg.light_adc_channel)?;
        writeln!(
            self.sink,
            "- Temperatura e Umidade do ar (DHT11 - pino {})",
            cfg.dht_pin
        )?;
        writeln!(self.sink, "======================================")?;
        self.sink.flush()?;
        Ok(())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
