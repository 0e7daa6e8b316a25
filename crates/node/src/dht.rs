//! Bit-banged DHT11 driver on a single GPIO line.
//!
//! One read transaction per call: the host pulls the line low for 18 ms,
//! releases it, then the sensor answers with an 80 µs/80 µs presence pulse
//! followed by 40 data bits. Each bit is a fixed ~50 µs low period plus a
//! high period whose width encodes the bit (~26–28 µs = 0, ~70 µs = 1).
//!
//! Every failure mode — no presence pulse, an edge that never arrives, a
//! checksum mismatch — is reported as the single `DhtError`; the caller does
//! not care which wire-level fault occurred.

use std::fmt;

#[cfg(feature = "hw")]
use std::time::{Duration, Instant};

#[cfg(feature = "hw")]
use rppal::gpio::{Gpio, IoPin, Mode};

use crate::sample::ProbeReading;

/// High-pulse width above which a data pulse is read as a 1 bit. A 0 bit is
/// nominally 26–28 µs high, a 1 bit ~70 µs, so 50 µs splits them cleanly.
const BIT_THRESHOLD_US: u64 = 50;

/// Frame layout: humidity int, humidity tenths, temperature int,
/// temperature tenths, checksum.
const FRAME_LEN: usize = 5;

/// Longest we wait for any single edge before declaring the read dead.
#[cfg(feature = "hw")]
const EDGE_TIMEOUT: Duration = Duration::from_micros(200);

/// Host start signal: hold the line low at least 18 ms.
#[cfg(feature = "hw")]
const START_SIGNAL_LOW: Duration = Duration::from_millis(18);

/// Uniform probe read failure. The wire-level cause is logged at the point
/// of failure but not distinguished in the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DhtError;

impl fmt::Display for DhtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DHT11 read transaction failed")
    }
}

impl std::error::Error for DhtError {}

/// Classify one data pulse by the width of its high period.
fn bit_from_pulse(high_us: u64) -> u8 {
    u8::from(high_us > BIT_THRESHOLD_US)
}

/// Decode a complete 5-byte frame into a probe reading.
///
/// The checksum is the wrapping sum of the first four bytes. DHT11 tenths
/// bytes are zero on genuine parts but populated on some clones, so they
/// are honoured rather than ignored.
fn decode_frame(frame: &[u8; FRAME_LEN]) -> Result<ProbeReading, DhtError> {
    let sum = frame[0]
        .wrapping_add(frame[1])
        .wrapping_add(frame[2])
        .wrapping_add(frame[3]);
    if sum != frame[4] {
        tracing::warn!(
            expected = frame[4],
            computed = sum,
            "dht11 checksum mismatch"
        );
        return Err(DhtError);
    }

    Ok(ProbeReading {
        humidity: f32::from(frame[0]) + f32::from(frame[1]) / 10.0,
        temperature_c: f32::from(frame[2]) + f32::from(frame[3]) / 10.0,
    })
}

// ── Driver ──────────────────────────────────────────────────────────────────

/// DHT11 driver on one GPIO pin, switching between output (start signal)
/// and input (sensor response) each transaction.
#[cfg(feature = "hw")]
pub struct Dht11 {
    pin: IoPin,
}

#[cfg(feature = "hw")]
impl Dht11 {
    pub fn new(pin_num: u8) -> anyhow::Result<Self> {
        let gpio = Gpio::new()?;
        let mut pin = gpio.get(pin_num)?.into_io(Mode::Input);
        pin.set_pullupdown(rppal::gpio::PullUpDown::PullUp);
        tracing::info!(pin = pin_num, "dht11 initialised");
        Ok(Self { pin })
    }

    /// One read transaction. No retries — the caller decides what a failed
    /// tick means.
    pub fn read(&mut self) -> Result<ProbeReading, DhtError> {
        let frame = self.read_frame()?;
        decode_frame(&frame)
    }

    fn read_frame(&mut self) -> Result<[u8; FRAME_LEN], DhtError> {
        // Host start signal: pull low ≥18 ms, then release and let the
        // pull-up bring the line high.
        self.pin.set_mode(Mode::Output);
        self.pin.set_low();
        std::thread::sleep(START_SIGNAL_LOW);
        self.pin.set_high();
        self.pin.set_mode(Mode::Input);

        // Presence pulse: ~80 µs low then ~80 µs high.
        self.wait_for(false)?;
        self.wait_for(true)?;
        self.wait_for(false)?;

        // 40 data bits, MSB first.
        let mut frame = [0u8; FRAME_LEN];
        for i in 0..FRAME_LEN * 8 {
            // ~50 µs low preamble, then the width-coded high pulse.
            self.wait_for(true)?;
            let high_started = Instant::now();
            self.wait_for(false)?;
            let high_us = high_started.elapsed().as_micros() as u64;

            frame[i / 8] = (frame[i / 8] << 1) | bit_from_pulse(high_us);
        }

        Ok(frame)
    }

    /// Busy-wait until the line reaches `level`, or time out.
    fn wait_for(&self, level: bool) -> Result<(), DhtError> {
        let deadline = Instant::now() + EDGE_TIMEOUT;
        while self.pin.is_high() != level {
            if Instant::now() > deadline {
                tracing::warn!(level, "dht11 timed out waiting for edge");
                return Err(DhtError);
            }
        }
        Ok(())
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────
