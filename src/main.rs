//! LM Health Therapy Module: Main Entry Point
//!
//! Hexagonal architecture with a single cooperative loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  BleLink            LogEventSink      Esp32TimeAdapter         │
//! │  (Link+Notify)      (EventSink)       (ClockPort)              │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  FSM · AttributeRegistry · DeviceInfo · SyncDriver     │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! │                                                                │
//! │  StatusLed (mirrors session state)                             │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{AnyOutputPin, PinDriver};
use log::{error, info, warn};

use lmtherapy::adapters::ble::BleLink;
use lmtherapy::adapters::log_sink::LogEventSink;
use lmtherapy::adapters::time::Esp32TimeAdapter;
use lmtherapy::app::service::AppService;
use lmtherapy::config::SystemConfig;
use lmtherapy::drivers::status_led::StatusLed;
use lmtherapy::pins;

/// Yield between loop iterations so the idle task can feed the watchdog.
const LOOP_YIELD_MS: u32 = 1;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  LM Health Therapy v{}            ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Configuration (compile-time defaults) ──────────────
    let config = SystemConfig::default();

    // ── 3. Peripherals ────────────────────────────────────────
    // SAFETY: the status LED GPIO is not claimed anywhere else.
    let led_pin = unsafe { AnyOutputPin::new(pins::STATUS_LED_GPIO) };
    let mut led = StatusLed::new(PinDriver::output(led_pin)?)?;

    // ── 4. Adapters + service ─────────────────────────────────
    let clock = Esp32TimeAdapter::new();
    let mut link = BleLink::new();
    let mut sink = LogEventSink::new();
    let mut delay = FreeRtos;
    let mut app = AppService::new(config);

    if let Err(e) = app.boot(&mut link, &clock, &mut sink) {
        // Without the link the device is unusable; halt.
        error!("boot failed: {}, halting", e);
        #[allow(clippy::empty_loop)]
        loop {}
    }

    // ── 5. Main loop ──────────────────────────────────────────
    loop {
        app.poll(&mut link, &clock, &mut delay, &mut sink);

        if let Err(e) = led.show_session(app.is_session_active()) {
            warn!("status LED write failed: {}", e);
        }

        FreeRtos::delay_ms(LOOP_YIELD_MS);
    }
}
