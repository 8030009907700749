//! Application core: pure domain logic, zero I/O.
//!
//! This module contains the business rules for the therapy module:
//! session lifecycle, attribute synchronisation and device info upkeep.
//! All interaction with the radio, the clock and the log happens through
//! **port traits** defined in [`ports`], keeping this layer fully testable
//! without real peripherals.

pub mod commands;
pub mod events;
pub mod ports;
pub mod service;
