//! Data types for the MAX1704x driver.

use crate::registers::{ConfigBits, decode_alert_threshold};

/// Supported parts. They share one register map; the MAX17049 monitors a
/// 2S pack, so its VCELL count is worth twice as much.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum GaugeVariant {
    /// 1S, 0-5 V range with 1.25 mV resolution.
    #[default]
    Max17048,
    /// 2S, 0-10 V range with 2.5 mV resolution.
    Max17049,
}

impl GaugeVariant {
    /// Multiplier applied to the VCELL conversion.
    pub const fn scale_factor(self) -> u8 {
        match self {
            GaugeVariant::Max17048 => 1,
            GaugeVariant::Max17049 => 2,
        }
    }
}

/// Decoded CONFIG register (0x0C).
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ConfigRegister {
    /// RCOMP, tunes the model for temperature and load.
    pub compensation: u8,
    /// Raw LSB: sleep, alert and threshold bits.
    pub status: u8,
}

impl ConfigRegister {
    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        Self {
            compensation: bytes[0],
            status: bytes[1],
        }
    }

    pub fn to_bytes(self) -> [u8; 2] {
        [self.compensation, self.status]
    }

    pub fn bits(&self) -> ConfigBits {
        ConfigBits::from_bits_truncate(self.status)
    }

    pub fn sleeping(&self) -> bool {
        self.bits().contains(ConfigBits::SLEEP)
    }

    pub fn alert_pending(&self) -> bool {
        self.bits().contains(ConfigBits::ALRT)
    }

    /// Alert threshold in percent (1..=32).
    pub fn alert_threshold(&self) -> u8 {
        decode_alert_threshold(self.status)
    }
}
