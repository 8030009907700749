//! LM Health therapy module firmware library.
//!
//! Exposes the pure-logic modules for integration testing and external
//! inspection. All ESP-IDF-specific code is guarded by
//! `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod app;
pub mod config;
pub mod device_info;
pub mod error;
pub mod fsm;
pub mod gatt;
pub mod pins;
pub mod sync;

// The ESP-IDF implementations are guarded by cfg attributes inside; host
// builds get the simulation half.
pub mod adapters;
pub mod drivers;
