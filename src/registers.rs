//! Register map and constants for MAX17048/MAX17049.
//! Both parts share the same map; only the VCELL full-scale range differs.

use crate::data_types::GaugeVariant;

/// Fixed 7-bit I2C address of the MAX1704x family.
pub const I2C_ADDRESS: u8 = 0x36;

/// Register addresses. Multi-byte registers are big-endian (MSB first).
pub mod addr {
    /// Cell voltage, 12-bit ADC count in the top 12 bits.
    pub const VCELL: u8 = 0x02;
    /// State of charge, MSB in percent and LSB in 1/256 %.
    pub const SOC: u8 = 0x04;
    /// Mode (write-only quick-start command).
    pub const MODE: u8 = 0x06;
    /// Production version.
    pub const VERSION: u8 = 0x08;
    /// CONFIG: MSB = RCOMP compensation, LSB = sleep/alert/threshold byte.
    pub const CONFIG: u8 = 0x0C;
    /// RCOMP shares the CONFIG MSB.
    pub const RCOMP: u8 = 0x0C;
    /// CONFIG LSB accessed directly (ATHD + status bits).
    pub const ATHRD: u8 = 0x0D;
    /// Command (write-only full reset).
    pub const COMMAND: u8 = 0xFE;
}

/// MODE payload that restarts fuel-gauge calculations.
pub const QUICK_START_CMD: [u8; 2] = [0x40, 0x00];
/// COMMAND payload that resets the chip as if power had been removed.
pub const RESET_CMD: [u8; 2] = [0x54, 0x00];

/// VCELL resolution at scale 1 (MAX17048), volts per count.
pub const VCELL_LSB_V: f64 = 0.00125;

/// Lowest alert threshold in percent.
pub const ALERT_THRESHOLD_MIN: u8 = 1;
/// Highest alert threshold in percent (stored as ATHD 0).
pub const ALERT_THRESHOLD_MAX: u8 = 32;

/// Power-on RCOMP (CONFIG MSB of 0x971C).
pub const DEFAULT_COMPENSATION: u8 = 0x97;
/// Power-on alert threshold in percent (CONFIG LSB 0x1C).
pub const DEFAULT_ALERT_THRESHOLD: u8 = 4;

bitflags::bitflags! {
    /// CONFIG LSB bits (0x0D).
    #[derive(Clone, Copy, Debug, Eq, PartialEq)]
    pub struct ConfigBits: u8 {
        /// Bit 7: Sleep mode forced.
        const SLEEP = 1 << 7;
        /// Bit 5: Alert flag, set by the IC and cleared by software.
        const ALRT  = 1 << 5;
        /// Bits 4-0: Empty alert threshold, stored as `32 - percent`.
        const ATHD  = 0b0001_1111;
    }
}

/// Clamp an alert threshold to the 1..=32 % range the IC supports.
pub fn clamp_alert_threshold(percent: u8) -> u8 {
    percent.clamp(ALERT_THRESHOLD_MIN, ALERT_THRESHOLD_MAX)
}

/// Clamp `percent` to 1..=32 and encode it into the 5-bit ATHD field.
pub fn encode_alert_threshold(percent: u8) -> u8 {
    let percent = clamp_alert_threshold(percent);
    (!percent).wrapping_add(1) & ConfigBits::ATHD.bits()
}

/// Decode the ATHD field of a status byte back into percent (1..=32).
pub fn decode_alert_threshold(status: u8) -> u8 {
    (!status & ConfigBits::ATHD.bits()) + 1
}

/// Convert raw VCELL bytes to volts for the given part.
pub fn vcell_to_volts(bytes: [u8; 2], variant: GaugeVariant) -> f64 {
    let raw = ((bytes[0] as u16) << 4) + ((bytes[1] as u16) >> 4);
    raw as f64 * VCELL_LSB_V * variant.scale_factor() as f64
}

/// Convert raw SOC bytes to percent.
pub fn soc_to_percent(bytes: [u8; 2]) -> f64 {
    bytes[0] as f64 + bytes[1] as f64 / 256.0
}

/// Combine the VERSION bytes, MSB first.
pub fn version_from_bytes(bytes: [u8; 2]) -> u16 {
    u16::from_be_bytes(bytes)
}
