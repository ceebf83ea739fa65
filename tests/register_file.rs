//! Behavioural tests against a register-file fake that keeps what is written.

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, Operation};
use max1704x_rs::{GaugeVariant, Max1704x};

/// Byte-addressed MAX1704x stand-in. A write of 0x5400 to COMMAND restores the
/// power-on CONFIG value the way the real part does.
struct FakeGauge {
    regs: [u8; 256],
    pointer: u8,
    resets: usize,
}

impl FakeGauge {
    fn new() -> Self {
        let mut fake = Self {
            regs: [0; 256],
            pointer: 0,
            resets: 0,
        };
        fake.power_on();
        fake.resets = 0;
        fake
    }

    fn power_on(&mut self) {
        self.regs[0x0C] = 0x97;
        self.regs[0x0D] = 0x1C;
        self.resets += 1;
    }
}

impl ErrorType for FakeGauge {
    type Error = ErrorKind;
}

impl I2c for FakeGauge {
    fn transaction(&mut self, address: u8, operations: &mut [Operation<'_>]) -> Result<(), Self::Error> {
        if address != 0x36 {
            return Err(ErrorKind::Other);
        }
        for op in operations {
            match op {
                Operation::Write(bytes) => {
                    let Some((&reg, payload)) = bytes.split_first() else {
                        continue;
                    };
                    self.pointer = reg;
                    if reg == 0xFE && payload == [0x54, 0x00] {
                        self.power_on();
                        continue;
                    }
                    for (i, b) in payload.iter().enumerate() {
                        self.regs[reg.wrapping_add(i as u8) as usize] = *b;
                    }
                }
                Operation::Read(buf) => {
                    for (i, b) in buf.iter_mut().enumerate() {
                        *b = self.regs[self.pointer.wrapping_add(i as u8) as usize];
                    }
                }
            }
        }
        Ok(())
    }
}

#[test]
fn sleep_then_sleeping() {
    let mut driver = Max1704x::new(FakeGauge::new(), GaugeVariant::Max17048);
    driver.sleep().unwrap();
    assert!(driver.sleeping().unwrap());
    driver.wake().unwrap();
    assert!(!driver.sleeping().unwrap());
}

#[test]
fn sleep_and_wake_keep_threshold_for_every_value() {
    let mut driver = Max1704x::new(FakeGauge::new(), GaugeVariant::Max17048);
    for percent in 1..=32 {
        driver.set_alert_threshold(percent).unwrap();
        driver.sleep().unwrap();
        assert_eq!(driver.get_alert_threshold().unwrap(), percent);
        driver.wake().unwrap();
        assert_eq!(driver.get_alert_threshold().unwrap(), percent);
    }
}

#[test]
fn set_alert_threshold_clamps() {
    let mut driver = Max1704x::new(FakeGauge::new(), GaugeVariant::Max17048);
    driver.set_alert_threshold(0).unwrap();
    assert_eq!(driver.get_alert_threshold().unwrap(), 1);
    driver.set_alert_threshold(200).unwrap();
    assert_eq!(driver.get_alert_threshold().unwrap(), 32);
}

#[test]
fn set_alert_threshold_keeps_sleep_state() {
    let mut driver = Max1704x::new(FakeGauge::new(), GaugeVariant::Max17048);
    driver.sleep().unwrap();
    driver.set_alert_threshold(15).unwrap();
    assert!(driver.sleeping().unwrap());
    assert_eq!(driver.get_alert_threshold().unwrap(), 15);
}

#[test]
fn set_compensation_keeps_threshold() {
    let mut driver = Max1704x::new(FakeGauge::new(), GaugeVariant::Max17048);
    driver.set_alert_threshold(10).unwrap();
    driver.set_compensation(0x5A).unwrap();
    assert_eq!(driver.get_compensation().unwrap(), 0x5A);
    assert_eq!(driver.get_alert_threshold().unwrap(), 10);
}

#[test]
fn clear_alert_interrupt_drops_alrt_only() {
    let mut fake = FakeGauge::new();
    fake.regs[0x0D] = 0x80 | 0x20 | 0x16;
    let mut driver = Max1704x::new(fake, GaugeVariant::Max17048);
    assert!(driver.alert_pending().unwrap());
    driver.clear_alert_interrupt().unwrap();
    assert!(!driver.alert_pending().unwrap());
    assert!(driver.sleeping().unwrap());
    assert_eq!(driver.get_alert_threshold().unwrap(), 10);
}

#[test]
fn voltage_read_resets_configuration() {
    let mut fake = FakeGauge::new();
    fake.regs[0x02] = 0xD0;
    fake.regs[0x03] = 0x00;
    let mut driver = Max1704x::new(fake, GaugeVariant::Max17048);
    driver.set_alert_threshold(10).unwrap();
    driver.set_compensation(0x40).unwrap();

    let volts = driver.get_voltage().unwrap();
    assert!((volts - 4.16).abs() < 1e-9);

    // The reset in front of every measurement restores power-on CONFIG.
    let cfg = driver.read_config().unwrap();
    assert_eq!(cfg.compensation, 0x97);
    assert_eq!(cfg.alert_threshold(), 4);
    assert_eq!(driver.free().resets, 1);
}

#[test]
fn soc_read_resets_every_time() {
    let mut fake = FakeGauge::new();
    fake.regs[0x04] = 87;
    fake.regs[0x05] = 64;
    let mut driver = Max1704x::new(fake, GaugeVariant::Max17048);
    assert_eq!(driver.get_soc().unwrap(), 87.25);
    assert_eq!(driver.get_soc().unwrap(), 87.25);
    let fake = driver.free();
    assert_eq!(fake.resets, 2);
    // Quick-start landed in MODE.
    assert_eq!(fake.regs[0x06], 0x40);
}
