//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements           | Connects to              |
//! |------------|----------------------|--------------------------|
//! | `ble`      | LinkPort, NotifyPort | Bluedroid GATT server    |
//! | `log_sink` | EventSink            | Serial log output        |
//! | `time`     | ClockPort            | ESP32 system timer       |

pub mod ble;
pub mod log_sink;
pub mod time;
