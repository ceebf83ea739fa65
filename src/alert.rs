//! ALRT pin handling.
//!
//! The MAX1704x pulls its open-drain ALRT pin low when SOC drops below the
//! configured threshold, so an alert is a falling edge on that line. The
//! handler is an injectable capability: anything implementing
//! [`AlertHandler`], including a plain `FnMut()` closure.
//!
//! When the handler is called from an interrupt it preempts whatever the main
//! flow is doing, possibly in the middle of a multi-byte I2C transaction on
//! the gauge. Register reads and writes are not re-entrant, so a handler
//! should only record the event (set a flag, signal a task) and leave bus I/O
//! such as [`clear_alert_interrupt`](crate::Max1704x::clear_alert_interrupt)
//! to the main flow.

use embedded_hal::digital::InputPin;

/// Receives ALRT falling-edge notifications.
pub trait AlertHandler {
    fn on_alert(&mut self);
}

impl<F: FnMut()> AlertHandler for F {
    fn on_alert(&mut self) {
        self()
    }
}

/// Marker for a driver built without an alert line.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct NoAlert;

/// ALRT input pin paired with the handler that fires on its falling edge.
pub struct AlertLine<P, H> {
    pin: P,
    handler: H,
    // ALRT idles high behind its pull-up.
    was_high: bool,
}

impl<P, H> AlertLine<P, H> {
    pub fn new(pin: P, handler: H) -> Self {
        Self {
            pin,
            handler,
            was_high: true,
        }
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }

    /// Give back the pin and handler.
    pub fn release(self) -> (P, H) {
        (self.pin, self.handler)
    }
}

impl<P, H> AlertLine<P, H>
where
    P: InputPin,
    H: AlertHandler,
{
    /// Sample the pin and fire the handler on a high-to-low transition since the
    /// previous sample. Returns whether the handler ran.
    ///
    /// For platforms without an edge-triggered interrupt vector: call this from
    /// the main loop or a timer tick.
    pub fn poll(&mut self) -> Result<bool, P::Error> {
        let high = self.pin.is_high()?;
        let fell = self.was_high && !high;
        self.was_high = high;
        if fell {
            #[cfg(feature = "defmt")]
            defmt::debug!("MAX1704x ALRT falling edge");
            self.handler.on_alert();
        }
        Ok(fell)
    }
}

#[cfg(feature = "async")]
impl<P, H> AlertLine<P, H>
where
    P: embedded_hal_async::digital::Wait,
    H: AlertHandler,
{
    /// Wait for the next falling edge on ALRT, then fire the handler.
    pub async fn wait_async(&mut self) -> Result<(), P::Error> {
        self.pin.wait_for_falling_edge().await?;
        #[cfg(feature = "defmt")]
        defmt::debug!("MAX1704x ALRT falling edge");
        self.was_high = false;
        self.handler.on_alert();
        Ok(())
    }
}
