//! MAX17048/MAX17049 Rust Driver
//!
//! `no_std` driver for the Maxim ModelGauge fuel gauges on I2C address 0x36.
//! Blocking access goes through `embedded-hal` 1.0; the `async` feature adds
//! `*_async` mirrors over `embedded-hal-async`, and `defmt` enables logging.
//!
//! Unlike the Arduino-era API this driver grew out of, read accessors return
//! `Result` too: a bus fault during a read is reported as [`Error::I2c`]
//! instead of yielding stale or zero data.
//!
//! Reading the cell voltage or state of charge first resets the chip and
//! issues a quick-start, which restarts the gauge's SOC estimation. These
//! reads are therefore not idempotent.

#![no_std]

pub mod alert;
pub mod data_types;
pub mod driver;
pub mod error;
pub mod registers;

pub use alert::{AlertHandler, AlertLine, NoAlert};
pub use data_types::{ConfigRegister, GaugeVariant};
pub use driver::Max1704x;
pub use error::Error;
pub use registers::I2C_ADDRESS;
