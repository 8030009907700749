//! Session status LED driver.
//!
//! A single discrete LED that mirrors the session state: lit while a
//! therapy session is active, dark otherwise.
//!
//! ## Dual-target design
//!
//! Generic over [`embedded_hal::digital::OutputPin`].  On ESP-IDF the pin
//! is an `esp_idf_hal` `PinDriver`; on host/test any mock pin works.

use embedded_hal::digital::OutputPin;

pub struct StatusLed<P: OutputPin> {
    pin: P,
    lit: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Take ownership of `pin` and drive it low.
    pub fn new(mut pin: P) -> Result<Self, P::Error> {
        pin.set_low()?;
        Ok(Self { pin, lit: false })
    }

    /// Mirror the session state.  Only touches the pin on change.
    pub fn show_session(&mut self, active: bool) -> Result<(), P::Error> {
        if active == self.lit {
            return Ok(());
        }
        if active {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.lit = active;
        Ok(())
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}
