//! Status LED blink codes. The `hw` feature gates the real rppal driver;
//! without it, a mock implementation records pulses and logs them.
//!
//! Pulses are blocking on/off toggles. Their wall-clock cost is deliberately
//! not subtracted from the tick sleep, so the actual period stretches past
//! nominal whenever the fault pattern runs.

use std::time::Duration;

#[cfg(feature = "hw")]
use rppal::gpio::{Gpio, OutputPin};

/// A fixed blink code: `count` on/off toggle pairs, each phase lasting
/// `period`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulsePattern {
    pub count: u32,
    pub period: Duration,
}

/// Boot acknowledgment: 3 × 200 ms.
pub const BOOT: PulsePattern = PulsePattern {
    count: 3,
    period: Duration::from_millis(200),
};

/// Successful tick: 2 × 100 ms.
pub const TICK_OK: PulsePattern = PulsePattern {
    count: 2,
    period: Duration::from_millis(100),
};

/// Failed probe read: 3 × 500 ms, visibly slower than the success code.
pub const TICK_FAULT: PulsePattern = PulsePattern {
    count: 3,
    period: Duration::from_millis(500),
};

// ---------------------------------------------------------------------------
// Real GPIO LED (production — requires rppal + Raspberry Pi hardware)
// ---------------------------------------------------------------------------
#[cfg(feature = "hw")]
pub struct StatusLed {
    pin: OutputPin,
}

#[cfg(feature = "hw")]
impl StatusLed {
    pub fn new(pin_num: u8) -> anyhow::Result<Self> {
        let gpio = Gpio::new()?;
        let mut pin = gpio.get(pin_num)?.into_output();
        pin.set_low(); // dark at startup
        Ok(Self { pin })
    }

    /// Blink the pattern to completion. Blocks for
    /// `2 * count * period` of wall-clock time.
    pub fn pulse(&mut self, pattern: PulsePattern) {
        for _ in 0..pattern.count {
            self.pin.set_high();
            std::thread::sleep(pattern.period);
            self.pin.set_low();
            std::thread::sleep(pattern.period);
        }
    }
}

// ---------------------------------------------------------------------------
// Mock LED (development — no hardware, records pulses)
// ---------------------------------------------------------------------------

/// How many recent pulses the mock keeps. The recording exists so tests can
/// inspect blink codes; the process runs an infinite loop, so the history
/// must stay bounded.
#[cfg(not(feature = "hw"))]
const PULSE_HISTORY: usize = 16;

#[cfg(not(feature = "hw"))]
pub struct StatusLed {
    pub(crate) pulses: Vec<PulsePattern>,
}

#[cfg(not(feature = "hw"))]
impl StatusLed {
    pub fn new(pin_num: u8) -> anyhow::Result<Self> {
        tracing::debug!(pin = pin_num, "status led registered (not wired)");
        Ok(Self { pulses: Vec::new() })
    }

    /// Record the pattern without sleeping; the blink codes only matter for
    /// a human watching real hardware. Keeps the last `PULSE_HISTORY`
    /// entries only.
    pub fn pulse(&mut self, pattern: PulsePattern) {
        tracing::debug!(count = pattern.count, period_ms = pattern.period.as_millis() as u64, "led pulse");
        if self.pulses.len() == PULSE_HISTORY {
            self.pulses.remove(0);
        }
        self.pulses.push(pattern);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
