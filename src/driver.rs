//! Driver for MAX1704x.
//! Provides blocking I2C access; the async version mirrors this API behind the `async` feature.

use embedded_hal::digital::InputPin;

use crate::alert::{AlertHandler, AlertLine, NoAlert};
use crate::data_types::{ConfigRegister, GaugeVariant};
use crate::error::Error;
use crate::registers::{
    addr, clamp_alert_threshold, decode_alert_threshold, encode_alert_threshold, soc_to_percent, vcell_to_volts, version_from_bytes,
    ConfigBits, I2C_ADDRESS, QUICK_START_CMD, RESET_CMD,
};

/// MAX17048/MAX17049 fuel gauge.
///
/// The chip's registers are the only state; every accessor goes to the bus.
/// `A` is the alert capability: [`NoAlert`] or an [`AlertLine`].
pub struct Max1704x<I2C, A = NoAlert> {
    i2c: I2C,
    variant: GaugeVariant,
    alert: A,
}

impl<I2C> Max1704x<I2C, NoAlert> {
    /// Create a driver without an alert line.
    pub fn new(i2c: I2C, variant: GaugeVariant) -> Self {
        Self {
            i2c,
            variant,
            alert: NoAlert,
        }
    }
}

impl<I2C, P, H> Max1704x<I2C, AlertLine<P, H>> {
    /// Create a driver whose `handler` fires on a falling edge of the ALRT `pin`.
    ///
    /// See [`crate::alert`] for the constraints on what the handler may do.
    pub fn with_alert(i2c: I2C, variant: GaugeVariant, pin: P, handler: H) -> Self {
        Self {
            i2c,
            variant,
            alert: AlertLine::new(pin, handler),
        }
    }
}

impl<I2C, P, H> Max1704x<I2C, AlertLine<P, H>>
where
    P: InputPin,
    H: AlertHandler,
{
    /// Sample ALRT and run the handler on a falling edge. Does not touch the bus.
    pub fn poll_alert(&mut self) -> Result<bool, P::Error> {
        self.alert.poll()
    }
}

impl<I2C, A> Max1704x<I2C, A> {
    /// Part selected at construction.
    pub fn variant(&self) -> GaugeVariant {
        self.variant
    }

    /// Return the 7-bit I2C address (fixed at 0x36).
    pub fn address(&self) -> u8 {
        I2C_ADDRESS
    }

    pub fn alert_mut(&mut self) -> &mut A {
        &mut self.alert
    }

    /// Destroy the driver and return the bus.
    pub fn free(self) -> I2C {
        self.i2c
    }

    /// Destroy the driver and return the bus together with the alert capability.
    pub fn release(self) -> (I2C, A) {
        (self.i2c, self.alert)
    }
}

impl<I2C, A> Max1704x<I2C, A>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Write a 16-bit register, MSB first.
    pub fn write_word(&mut self, reg: u8, bytes: [u8; 2]) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(I2C_ADDRESS, &[reg, bytes[0], bytes[1]])
            .map_err(Error::I2c)
    }

    /// Read a burst starting at a register.
    pub fn read_regs(&mut self, start_reg: u8, data: &mut [u8]) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write_read(I2C_ADDRESS, &[start_reg], data)
            .map_err(Error::I2c)
    }

    /// Read a 16-bit register as `[msb, lsb]`.
    pub fn read_word(&mut self, reg: u8) -> Result<[u8; 2], Error<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.read_regs(reg, &mut buf)?;
        Ok(buf)
    }

    /// Read a single byte.
    pub fn read_byte(&mut self, reg: u8) -> Result<u8, Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.read_regs(reg, &mut buf)?;
        Ok(buf[0])
    }

    /// Force the IC to restart fuel-gauge calculations.
    pub fn quick_start(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_word(addr::MODE, QUICK_START_CMD)
    }

    /// Force a full reset, as if power had been removed.
    pub fn reset(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_word(addr::COMMAND, RESET_CMD)
    }

    // Reset + quick-start run before every VCELL/SOC read.
    fn restart_gauge(&mut self) -> Result<(), Error<I2C::Error>> {
        // The IC resets on the last clocked bit and never ACKs this command.
        if let Err(_e) = self.reset() {
            #[cfg(feature = "defmt")]
            defmt::trace!("MAX1704x reset not acknowledged");
        }
        self.quick_start()
    }

    /// Cell voltage in volts: 0-5 V (1.25 mV LSB) on MAX17048, 0-10 V (2.5 mV LSB) on MAX17049.
    ///
    /// Resets the chip and restarts SOC estimation before reading.
    pub fn get_voltage(&mut self) -> Result<f64, Error<I2C::Error>> {
        self.restart_gauge()?;
        let bytes = self.read_word(addr::VCELL)?;
        let volts = vcell_to_volts(bytes, self.variant);
        #[cfg(feature = "defmt")]
        defmt::debug!("MAX1704x VCELL {=[u8]:#04x} -> {} V", &bytes[..], volts);
        Ok(volts)
    }

    /// Relative state of charge in percent, 1/256 % resolution.
    ///
    /// Resets the chip and restarts SOC estimation before reading.
    pub fn get_soc(&mut self) -> Result<f64, Error<I2C::Error>> {
        self.restart_gauge()?;
        let bytes = self.read_word(addr::SOC)?;
        let soc = soc_to_percent(bytes);
        #[cfg(feature = "defmt")]
        defmt::debug!("MAX1704x SOC {=[u8]:#04x} -> {} %", &bytes[..], soc);
        Ok(soc)
    }

    /// Production version of the IC.
    pub fn get_version(&mut self) -> Result<u16, Error<I2C::Error>> {
        Ok(version_from_bytes(self.read_word(addr::VERSION)?))
    }

    /// RCOMP byte (CONFIG MSB).
    pub fn get_compensation(&mut self) -> Result<u8, Error<I2C::Error>> {
        Ok(self.read_word(addr::RCOMP)?[0])
    }

    /// CONFIG LSB: sleep bit, alert flag and encoded threshold.
    pub fn get_status(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.read_byte(addr::ATHRD)
    }

    /// Alert threshold in percent (1..=32).
    pub fn get_alert_threshold(&mut self) -> Result<u8, Error<I2C::Error>> {
        Ok(decode_alert_threshold(self.get_status()?))
    }

    /// Read both CONFIG bytes in one transaction.
    pub fn read_config(&mut self) -> Result<ConfigRegister, Error<I2C::Error>> {
        Ok(ConfigRegister::from_bytes(self.read_word(addr::CONFIG)?))
    }

    /// Whether the IC has raised the SOC alert (ALRT bit).
    pub fn alert_pending(&mut self) -> Result<bool, Error<I2C::Error>> {
        let status = ConfigBits::from_bits_truncate(self.get_status()?);
        Ok(status.contains(ConfigBits::ALRT))
    }

    /// Set RCOMP, keeping the status byte as read.
    pub fn set_compensation(&mut self, compensation: u8) -> Result<(), Error<I2C::Error>> {
        let status = self.get_status()?;
        self.write_word(addr::CONFIG, [compensation, status])
    }

    /// Set the empty alert threshold. `percent` is clamped to 1..=32; the sleep bit is kept.
    pub fn set_alert_threshold(&mut self, percent: u8) -> Result<(), Error<I2C::Error>> {
        let percent = clamp_alert_threshold(percent);
        let athd = encode_alert_threshold(percent);
        let [compensation, status] = self.read_word(addr::CONFIG)?;
        let sleep_bit = status & ConfigBits::SLEEP.bits();
        #[cfg(feature = "defmt")]
        defmt::debug!("MAX1704x alert threshold {}% (ATHD {=u8:#04x})", percent, athd);
        self.write_word(addr::CONFIG, [compensation, sleep_bit | athd])
    }

    /// Clear the ALRT bit after an alert, leaving the other status bits alone.
    pub fn clear_alert_interrupt(&mut self) -> Result<(), Error<I2C::Error>> {
        let compensation = self.get_compensation()?;
        let status = self.get_status()?;
        self.write_word(addr::CONFIG, [compensation, status & !ConfigBits::ALRT.bits()])
    }

    /// Put the IC to sleep, halting all gauge operations.
    ///
    /// The threshold field is rebuilt from the decoded percentage, so any other
    /// status bits are written back as zero. The ATHD bits are re-encoded: the
    /// default 4 % gives a status byte of 0x9C, where the Arduino library wrote
    /// the raw percentage (0x84).
    pub fn sleep(&mut self) -> Result<(), Error<I2C::Error>> {
        let compensation = self.get_compensation()?;
        let athd = encode_alert_threshold(self.get_alert_threshold()?);
        self.write_word(addr::CONFIG, [compensation, ConfigBits::SLEEP.bits() | athd])
    }

    /// Wake the IC from sleep. Rebuilds the threshold field like [`Self::sleep`].
    pub fn wake(&mut self) -> Result<(), Error<I2C::Error>> {
        let compensation = self.get_compensation()?;
        let athd = encode_alert_threshold(self.get_alert_threshold()?);
        self.write_word(addr::CONFIG, [compensation, athd & !ConfigBits::SLEEP.bits()])
    }

    /// Whether the IC is in sleep mode.
    pub fn sleeping(&mut self) -> Result<bool, Error<I2C::Error>> {
        let status = ConfigBits::from_bits_truncate(self.get_status()?);
        Ok(status.contains(ConfigBits::SLEEP))
    }
}

#[cfg(feature = "async")]
impl<I2C, P, H> Max1704x<I2C, AlertLine<P, H>>
where
    P: embedded_hal_async::digital::Wait,
    H: AlertHandler,
{
    /// Wait for a falling edge on ALRT and run the handler.
    pub async fn wait_for_alert_async(&mut self) -> Result<(), P::Error> {
        self.alert.wait_async().await
    }
}

#[cfg(feature = "async")]
impl<I2C, A> Max1704x<I2C, A>
where
    I2C: embedded_hal_async::i2c::I2c,
{
    pub async fn write_word_async(&mut self, reg: u8, bytes: [u8; 2]) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write(I2C_ADDRESS, &[reg, bytes[0], bytes[1]])
            .await
            .map_err(Error::I2c)
    }

    pub async fn read_regs_async(&mut self, start_reg: u8, data: &mut [u8]) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .write_read(I2C_ADDRESS, &[start_reg], data)
            .await
            .map_err(Error::I2c)
    }

    pub async fn read_word_async(&mut self, reg: u8) -> Result<[u8; 2], Error<I2C::Error>> {
        let mut buf = [0u8; 2];
        self.read_regs_async(reg, &mut buf).await?;
        Ok(buf)
    }

    pub async fn read_byte_async(&mut self, reg: u8) -> Result<u8, Error<I2C::Error>> {
        let mut buf = [0u8; 1];
        self.read_regs_async(reg, &mut buf).await?;
        Ok(buf[0])
    }

    pub async fn quick_start_async(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_word_async(addr::MODE, QUICK_START_CMD).await
    }

    pub async fn reset_async(&mut self) -> Result<(), Error<I2C::Error>> {
        self.write_word_async(addr::COMMAND, RESET_CMD).await
    }

    async fn restart_gauge_async(&mut self) -> Result<(), Error<I2C::Error>> {
        if let Err(_e) = self.reset_async().await {
            #[cfg(feature = "defmt")]
            defmt::trace!("MAX1704x reset not acknowledged");
        }
        self.quick_start_async().await
    }

    /// Async version of [`Self::get_voltage`].
    pub async fn get_voltage_async(&mut self) -> Result<f64, Error<I2C::Error>> {
        self.restart_gauge_async().await?;
        let bytes = self.read_word_async(addr::VCELL).await?;
        let volts = vcell_to_volts(bytes, self.variant);
        #[cfg(feature = "defmt")]
        defmt::debug!("MAX1704x VCELL {=[u8]:#04x} -> {} V", &bytes[..], volts);
        Ok(volts)
    }

    /// Async version of [`Self::get_soc`].
    pub async fn get_soc_async(&mut self) -> Result<f64, Error<I2C::Error>> {
        self.restart_gauge_async().await?;
        let bytes = self.read_word_async(addr::SOC).await?;
        let soc = soc_to_percent(bytes);
        #[cfg(feature = "defmt")]
        defmt::debug!("MAX1704x SOC {=[u8]:#04x} -> {} %", &bytes[..], soc);
        Ok(soc)
    }

    pub async fn get_version_async(&mut self) -> Result<u16, Error<I2C::Error>> {
        Ok(version_from_bytes(self.read_word_async(addr::VERSION).await?))
    }

    pub async fn get_compensation_async(&mut self) -> Result<u8, Error<I2C::Error>> {
        Ok(self.read_word_async(addr::RCOMP).await?[0])
    }

    pub async fn get_status_async(&mut self) -> Result<u8, Error<I2C::Error>> {
        self.read_byte_async(addr::ATHRD).await
    }

    pub async fn get_alert_threshold_async(&mut self) -> Result<u8, Error<I2C::Error>> {
        Ok(decode_alert_threshold(self.get_status_async().await?))
    }

    pub async fn read_config_async(&mut self) -> Result<ConfigRegister, Error<I2C::Error>> {
        Ok(ConfigRegister::from_bytes(self.read_word_async(addr::CONFIG).await?))
    }

    pub async fn alert_pending_async(&mut self) -> Result<bool, Error<I2C::Error>> {
        let status = ConfigBits::from_bits_truncate(self.get_status_async().await?);
        Ok(status.contains(ConfigBits::ALRT))
    }

    pub async fn set_compensation_async(&mut self, compensation: u8) -> Result<(), Error<I2C::Error>> {
        let status = self.get_status_async().await?;
        self.write_word_async(addr::CONFIG, [compensation, status]).await
    }

    pub async fn set_alert_threshold_async(&mut self, percent: u8) -> Result<(), Error<I2C::Error>> {
        let percent = clamp_alert_threshold(percent);
        let athd = encode_alert_threshold(percent);
        let [compensation, status] = self.read_word_async(addr::CONFIG).await?;
        let sleep_bit = status & ConfigBits::SLEEP.bits();
        #[cfg(feature = "defmt")]
        defmt::debug!("MAX1704x alert threshold {}% (ATHD {=u8:#04x})", percent, athd);
        self.write_word_async(addr::CONFIG, [compensation, sleep_bit | athd]).await
    }

    pub async fn clear_alert_interrupt_async(&mut self) -> Result<(), Error<I2C::Error>> {
        let compensation = self.get_compensation_async().await?;
        let status = self.get_status_async().await?;
        self.write_word_async(addr::CONFIG, [compensation, status & !ConfigBits::ALRT.bits()])
            .await
    }

    pub async fn sleep_async(&mut self) -> Result<(), Error<I2C::Error>> {
        let compensation = self.get_compensation_async().await?;
        let athd = encode_alert_threshold(self.get_alert_threshold_async().await?);
        self.write_word_async(addr::CONFIG, [compensation, ConfigBits::SLEEP.bits() | athd])
            .await
    }

    pub async fn wake_async(&mut self) -> Result<(), Error<I2C::Error>> {
        let compensation = self.get_compensation_async().await?;
        let athd = encode_alert_threshold(self.get_alert_threshold_async().await?);
        self.write_word_async(addr::CONFIG, [compensation, athd & !ConfigBits::SLEEP.bits()])
            .await
    }

    pub async fn sleeping_async(&mut self) -> Result<bool, Error<I2C::Error>> {
        let status = ConfigBits::from_bits_truncate(self.get_status_async().await?);
        Ok(status.contains(ConfigBits::SLEEP))
    }
}
