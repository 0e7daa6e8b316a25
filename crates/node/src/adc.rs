//! MCP3008 10-bit ADC driver over SPI for the soil moisture and light
//! channels.
//!
//! Single-ended reads at a conservative 1.35 MHz clock. The MCP3008 is
//! native 10-bit, so raw values land directly in the 0–1023 range the
//! percent mappings expect — no rescaling.

#[cfg(feature = "hw")]
use anyhow::Context;
#[cfg(feature = "hw")]
use rppal::spi::{Bus, Mode, SlaveSelect, Spi};

use crate::config::MAX_ADC_CHANNEL;

// ── MCP3008 command frame ───────────────────────────────────────────────────
//
// Three-byte exchange (MSB first):
//   byte 0: 0000_0001             — start bit
//   byte 1: SGL/DIFF, D2..D0, x4  — 1000 = single-ended ch0, 1001 = ch1, …
//   byte 2: don't care (clocks out the low result bits)
//
// Response: bits [9:8] arrive in byte 1 (low two bits), bits [7:0] in byte 2.

/// Start bit, alone in the first command byte.
const START_BIT: u8 = 0x01;

/// Single-ended mode flag, ORed with the channel in the high nibble of the
/// second command byte.
const SINGLE_ENDED: u8 = 0x08;

/// Mask for the 10 result bits.
const RESULT_MASK: u16 = 0x03FF;

/// SPI clock rate. The MCP3008 tops out at 3.6 MHz at 5 V; 1.35 MHz keeps
/// plenty of margin at 3.3 V.
#[cfg(feature = "hw")]
const SPI_CLOCK_HZ: u32 = 1_350_000;

/// Build the 3-byte command frame for a single-ended read on `channel`.
fn command_for_channel(channel: u8) -> [u8; 3] {
    [START_BIT, (SINGLE_ENDED | channel) << 4, 0x00]
}

/// Extract the 10-bit conversion result from a 3-byte response frame.
fn decode_reading(buf: &[u8; 3]) -> u16 {
    (u16::from(buf[1]) << 8 | u16::from(buf[2])) & RESULT_MASK
}

// ── Driver ──────────────────────────────────────────────────────────────────

/// MCP3008 driver backed by `rppal::spi` (SPI0, CE0).
#[cfg(feature = "hw")]
pub struct Mcp3008 {
    spi: Spi,
}

#[cfg(feature = "hw")]
impl Mcp3008 {
    /// Open SPI0/CE0 in mode 0 for the MCP3008.
    pub fn new() -> anyhow::Result<Self> {
        let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, SPI_CLOCK_HZ, Mode::Mode0)
            .context("failed to open SPI bus for MCP3008")?;
        tracing::info!(clock_hz = SPI_CLOCK_HZ, "mcp3008 initialised");
        Ok(Self { spi })
    }

    /// Perform one single-ended conversion on `channel`, returning the raw
    /// 10-bit value (0–1023).
    pub fn read_channel(&mut self, channel: u8) -> anyhow::Result<u16> {
        anyhow::ensure!(
            channel <= MAX_ADC_CHANNEL,
            "MCP3008 channel {channel} out of range (0–{MAX_ADC_CHANNEL})"
        );

        let write = command_for_channel(channel);
        let mut read = [0u8; 3];
        self.spi
            .transfer(&mut read, &write)
            .with_context(|| format!("SPI transfer failed on channel {channel}"))?;

        Ok(decode_reading(&read))
    }
}

// ── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    // -- Command frame construction -------------------------------------------

    #[test]
    fn command_channel_0() {
        // SGL/DIFF=1, channel 000 → second byte 1000_0000
        assert_eq!(command_for_channel(0), [0x01, 0x80, 0x00]);
    }

    #[test]
    fn command_channel_1() {
        assert_eq!(command_for_channel(1), [0x01, 0x90, 0x00]);
    }

    #[test]
    fn command_channel_7() {
        assert_eq!(command_for_channel(7), [0x01, 0xF0, 0x00]);
    }

    #[test]
    fn command_always_starts_with_start_bit() {
        for ch in 0..=MAX_ADC_CHANNEL {
            assert_eq!(command_for_channel(ch)[0], 0x01, "channel {ch}");
        }
    }

    // -- Response decoding ----------------------------------------------------

    #[test]
    fn decode_zero() {
        assert_eq!(decode_reading(&[0x00, 0x00, 0x00]), 0);
    }

    #[test]
    fn decode_full_scale() {
        assert_eq!(decode_reading(&[0x00, 0x03, 0xFF]), 1023);
    }

    #[test]
    fn decode_mid_scale() {
        // 0b01_0010_1100 = 300
        assert_eq!(decode_reading(&[0x00, 0x01, 0x2C]), 300);
    }

    #[test]
    fn decode_masks_undefined_high_bits() {
        // Bits above [9:0] in the response are undefined on the wire and
        // must never leak into the result.
        assert_eq!(decode_reading(&[0xFF, 0xFF, 0xFF]), 1023);
    }

    #[test]
    fn decode_never_exceeds_10_bits() {
        for hi in 0..=0xFF_u8 {
            let v = decode_reading(&[0x00, hi, 0xAB]);
            assert!(v <= 1023, "decoded {v} from hi byte {hi:#04x}");
        }
    }
}
