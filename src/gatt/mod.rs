//! GATT attribute model: the wire codec, the declarative attribute table
//! and the registry that owns stored values and write handlers.
//!
//! ```text
//!   remote write ──▶ AttributeRegistry::handle_write ──▶ handler ──▶ AppCommand
//!   AppService   ──▶ AttributeRegistry::push ──▶ NotifyPort::publish (on change)
//! ```

pub mod attributes;
pub mod codec;
pub mod registry;
