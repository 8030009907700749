//! BLE peripheral link adapter.
//!
//! Implements [`LinkPort`], the hexagonal boundary for the GATT server
//! and advertising.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid BLE GATT server via `esp_idf_svc::sys`.
//! - **all other targets**: simulation for host-side tests.
//!
//! ## Registration
//!
//! Bluedroid registers attributes one callback at a time.  The GATTS
//! handler walks [`ATTRIBUTE_TABLE`] in order: create the group's service,
//! add each characteristic, then its user description (0x2901) and client
//! config (0x2902) descriptors where applicable, and move on.  When the
//! group changes, the next service is created.  [`BleLink::begin`] blocks
//! until the walk completes or times out.

use log::info;

use crate::app::ports::{InboundWrite, LinkPort, NotifyPort};
use crate::config::SystemConfig;
use crate::error::LinkError;
use crate::gatt::attributes::{AttributeId, Group};
#[cfg(not(target_os = "espidf"))]
use crate::gatt::attributes::{MAX_PAYLOAD_LEN, Payload};

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

/// Remote writes buffered between two main-loop iterations.
const INBOUND_QUEUE_LEN: usize = 8;

// ───────────────────────────────────────────────────────────────
// BLE state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BleState {
    Idle,
    Registered,
    Advertising,
    Connected,
    Failed,
}

// ── ESP-IDF BLE static state ──────────────────────────────────
//
// Bluedroid callbacks are C function pointers that cannot capture Rust
// closures. These statics bridge the callback context to the adapter.

#[cfg(target_os = "espidf")]
mod bridge {
    use core::sync::atomic::{AtomicBool, AtomicU16, AtomicU32, AtomicUsize};

    use crate::app::ports::InboundWrite;
    use crate::gatt::attributes::{AttributeId, Group};

    pub static GATTS_IF: AtomicU32 = AtomicU32::new(0);
    pub static CONN_ID: AtomicU32 = AtomicU32::new(0);
    pub static CONNECTED: AtomicBool = AtomicBool::new(false);

    /// Index into `ATTRIBUTE_TABLE` of the attribute being registered.
    pub static REG_CURSOR: AtomicUsize = AtomicUsize::new(0);
    /// Descriptor sub-step for the current attribute (0 = none added yet).
    pub static REG_DESCR_STEP: AtomicU32 = AtomicU32::new(0);
    pub static REG_DONE: AtomicBool = AtomicBool::new(false);
    pub static REG_FAILED: AtomicBool = AtomicBool::new(false);

    pub static SVC_HANDLES: [AtomicU16; Group::ALL.len()] =
        [const { AtomicU16::new(0) }; Group::ALL.len()];
    pub static CHAR_HANDLES: [AtomicU16; AttributeId::COUNT] =
        [const { AtomicU16::new(0) }; AttributeId::COUNT];

    pub static CONN_INTERVAL: AtomicU16 = AtomicU16::new(0x0018);
    pub static SUPERVISION_TIMEOUT: AtomicU16 = AtomicU16::new(500);

    // GATTS callbacks run in the Bluedroid task (not ISR), so std Mutex is safe.
    pub static INBOUND: std::sync::Mutex<heapless::Deque<InboundWrite, { super::INBOUND_QUEUE_LEN }>> =
        std::sync::Mutex::new(heapless::Deque::new());

    /// Therapy service UUID in little-endian order for the advertising payload.
    pub static ADV_SERVICE_UUID: [u8; 16] =
        crate::gatt::attributes::THERAPY_SERVICE_UUID.to_le_bytes();
}

#[cfg(target_os = "espidf")]
fn uuid128_to_esp(uuid: u128) -> esp_idf_svc::sys::esp_bt_uuid_t {
    let mut t: esp_idf_svc::sys::esp_bt_uuid_t = unsafe { core::mem::zeroed() };
    t.len = 16;
    t.uuid.uuid128 = uuid.to_le_bytes();
    t
}

#[cfg(target_os = "espidf")]
fn uuid16_to_esp(uuid: u16) -> esp_idf_svc::sys::esp_bt_uuid_t {
    let mut t: esp_idf_svc::sys::esp_bt_uuid_t = unsafe { core::mem::zeroed() };
    t.len = 2;
    t.uuid.uuid16 = uuid;
    t
}

#[cfg(target_os = "espidf")]
fn group_index(group: Group) -> usize {
    Group::ALL.iter().position(|g| *g == group).unwrap_or(0)
}

/// Handles a group's service needs: itself, plus declaration + value per
/// characteristic, plus one per descriptor.
fn service_handle_count(group: Group) -> u16 {
    let per_attr: usize = group
        .attributes()
        .map(|spec| {
            2 + usize::from(spec.description.is_some())
                + usize::from(spec.direction.notifiable())
        })
        .sum();
    (1 + per_attr) as u16
}

#[cfg(target_os = "espidf")]
unsafe fn create_service(gatts_if: esp_idf_svc::sys::esp_gatt_if_t, group: Group) {
    use esp_idf_svc::sys::*;
    let mut svc_id = esp_gatt_srvc_id_t {
        id: esp_gatt_id_t {
            uuid: uuid128_to_esp(group.uuid()),
            inst_id: 0,
        },
        is_primary: true,
    };
    unsafe {
        esp_ble_gatts_create_service(gatts_if, &mut svc_id, service_handle_count(group));
    }
}

#[cfg(target_os = "espidf")]
unsafe fn add_characteristic(cursor: usize) {
    use esp_idf_svc::sys::*;
    let spec = &crate::gatt::attributes::ATTRIBUTE_TABLE[cursor];
    let svc_handle = bridge::SVC_HANDLES[group_index(spec.group)]
        .load(core::sync::atomic::Ordering::Relaxed);

    let mut perm = 0u32;
    let mut prop = 0u32;
    if spec.direction.readable() {
        perm |= ESP_GATT_PERM_READ;
        prop |= ESP_GATT_CHAR_PROP_BIT_READ;
    }
    if spec.direction.writable() {
        perm |= ESP_GATT_PERM_WRITE;
        prop |= ESP_GATT_CHAR_PROP_BIT_WRITE;
    }
    if spec.direction.notifiable() {
        prop |= ESP_GATT_CHAR_PROP_BIT_NOTIFY;
    }

    let mut char_uuid = uuid128_to_esp(spec.uuid);
    let mut init = [0u8; 1];
    let mut value = esp_attr_value_t {
        attr_max_len: spec.max_len as u16,
        attr_len: 0,
        attr_value: init.as_mut_ptr(),
    };
    let mut control = esp_attr_control_t {
        auto_rsp: ESP_GATT_AUTO_RSP as u8,
    };
    unsafe {
        esp_ble_gatts_add_char(
            svc_handle,
            &mut char_uuid,
            perm as esp_gatt_perm_t,
            prop as esp_gatt_char_prop_t,
            &mut value,
            &mut control,
        );
    }
}

#[cfg(target_os = "espidf")]
unsafe fn add_descriptor(cursor: usize, uuid: u16, perm: u32, bytes: &[u8]) {
    use esp_idf_svc::sys::*;
    let spec = &crate::gatt::attributes::ATTRIBUTE_TABLE[cursor];
    let svc_handle = bridge::SVC_HANDLES[group_index(spec.group)]
        .load(core::sync::atomic::Ordering::Relaxed);

    let mut descr_uuid = uuid16_to_esp(uuid);
    // The stack copies the initial value before returning.
    let mut value = esp_attr_value_t {
        attr_max_len: bytes.len() as u16,
        attr_len: bytes.len() as u16,
        attr_value: bytes.as_ptr() as *mut u8,
    };
    let mut control = esp_attr_control_t {
        auto_rsp: ESP_GATT_AUTO_RSP as u8,
    };
    unsafe {
        esp_ble_gatts_add_char_descr(
            svc_handle,
            &mut descr_uuid,
            perm as esp_gatt_perm_t,
            &mut value,
            &mut control,
        );
    }
}

/// Add the next pending descriptor of `cursor`, or advance to the next
/// attribute when none remain.
#[cfg(target_os = "espidf")]
unsafe fn continue_registration(gatts_if: esp_idf_svc::sys::esp_gatt_if_t, cursor: usize) {
    use crate::gatt::attributes::{
        ATTRIBUTE_TABLE, DESCRIPTOR_CLIENT_CONFIG, DESCRIPTOR_USER_DESCRIPTION,
    };
    use core::sync::atomic::Ordering;
    use esp_idf_svc::sys::*;

    let spec = &ATTRIBUTE_TABLE[cursor];
    let step = bridge::REG_DESCR_STEP.load(Ordering::Relaxed);

    if step == 0 {
        bridge::REG_DESCR_STEP.store(1, Ordering::Relaxed);
        if let Some(text) = spec.description {
            unsafe {
                add_descriptor(
                    cursor,
                    DESCRIPTOR_USER_DESCRIPTION,
                    ESP_GATT_PERM_READ,
                    text.as_bytes(),
                );
            }
            return;
        }
    }
    if step <= 1 {
        bridge::REG_DESCR_STEP.store(2, Ordering::Relaxed);
        if spec.direction.notifiable() {
            static CCCD_OFF: [u8; 2] = [0, 0];
            unsafe {
                add_descriptor(
                    cursor,
                    DESCRIPTOR_CLIENT_CONFIG,
                    ESP_GATT_PERM_READ | ESP_GATT_PERM_WRITE,
                    &CCCD_OFF,
                );
            }
            return;
        }
    }

    let next = cursor + 1;
    bridge::REG_CURSOR.store(next, Ordering::Relaxed);
    bridge::REG_DESCR_STEP.store(0, Ordering::Relaxed);

    match ATTRIBUTE_TABLE.get(next) {
        None => {
            bridge::REG_DONE.store(true, Ordering::Release);
            log::info!("BLE GATTS: all attributes registered");
        }
        Some(next_spec) if next_spec.group != spec.group => unsafe {
            create_service(gatts_if, next_spec.group);
        },
        Some(_) => unsafe { add_characteristic(next) },
    }
}

#[cfg(target_os = "espidf")]
unsafe fn start_advertising() {
    use esp_idf_svc::sys::*;
    let mut adv_params = esp_ble_adv_params_t {
        adv_int_min: 0x20,
        adv_int_max: 0x40,
        adv_type: esp_ble_adv_type_t_ADV_TYPE_IND,
        own_addr_type: esp_ble_addr_type_t_BLE_ADDR_TYPE_PUBLIC,
        channel_map: esp_ble_adv_channel_t_ADV_CHNL_ALL,
        adv_filter_policy: esp_ble_adv_filter_t_ADV_FILTER_ALLOW_SCAN_ANY_CON_ANY,
        ..unsafe { core::mem::zeroed() }
    };
    unsafe {
        esp_ble_gap_start_advertising(&mut adv_params);
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gap_event_handler(
    event: esp_idf_svc::sys::esp_gap_ble_cb_event_t,
    _param: *mut esp_idf_svc::sys::esp_ble_gap_cb_param_t,
) {
    use esp_idf_svc::sys::*;
    match event {
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_DATA_SET_COMPLETE_EVT => unsafe {
            start_advertising();
        },
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_START_COMPLETE_EVT => {
            log::info!("BLE GAP: advertising started");
        }
        esp_gap_ble_cb_event_t_ESP_GAP_BLE_ADV_STOP_COMPLETE_EVT => {
            log::info!("BLE GAP: advertising stopped");
        }
        _ => {}
    }
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn ble_gatts_event_handler(
    event: esp_idf_svc::sys::esp_gatts_cb_event_t,
    gatts_if: esp_idf_svc::sys::esp_gatt_if_t,
    param: *mut esp_idf_svc::sys::esp_ble_gatts_cb_param_t,
) {
    use crate::gatt::attributes::ATTRIBUTE_TABLE;
    use core::sync::atomic::Ordering;
    use esp_idf_svc::sys::*;

    bridge::GATTS_IF.store(gatts_if as u32, Ordering::Relaxed);
    let cursor = bridge::REG_CURSOR.load(Ordering::Relaxed);

    match event {
        esp_gatts_cb_event_t_ESP_GATTS_REG_EVT => {
            log::info!("BLE GATTS: app registered (if={})", gatts_if);
            bridge::REG_CURSOR.store(0, Ordering::Relaxed);
            bridge::REG_DESCR_STEP.store(0, Ordering::Relaxed);
            unsafe { create_service(gatts_if, ATTRIBUTE_TABLE[0].group) };
        }
        esp_gatts_cb_event_t_ESP_GATTS_CREATE_EVT => {
            let p = unsafe { &(*param).create };
            if p.status != esp_gatt_status_t_ESP_GATT_OK {
                log::error!("BLE GATTS: service create failed ({})", p.status);
                bridge::REG_FAILED.store(true, Ordering::Release);
                return;
            }
            let group = ATTRIBUTE_TABLE[cursor].group;
            bridge::SVC_HANDLES[group_index(group)].store(p.service_handle, Ordering::Relaxed);
            log::info!(
                "BLE GATTS: {} service created (handle={})",
                group.name(),
                p.service_handle
            );
            unsafe {
                esp_ble_gatts_start_service(p.service_handle);
                add_characteristic(cursor);
            }
        }
        esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_EVT => {
            let p = unsafe { &(*param).add_char };
            if p.status != esp_gatt_status_t_ESP_GATT_OK {
                log::error!("BLE GATTS: add char {} failed ({})", cursor, p.status);
                bridge::REG_FAILED.store(true, Ordering::Release);
                return;
            }
            bridge::CHAR_HANDLES[cursor].store(p.attr_handle, Ordering::Relaxed);
            log::info!(
                "BLE GATTS: {:?} char (handle={})",
                ATTRIBUTE_TABLE[cursor].id,
                p.attr_handle
            );
            unsafe { continue_registration(gatts_if, cursor) };
        }
        esp_gatts_cb_event_t_ESP_GATTS_ADD_CHAR_DESCR_EVT => {
            let p = unsafe { &(*param).add_char_descr };
            if p.status != esp_gatt_status_t_ESP_GATT_OK {
                log::error!("BLE GATTS: add descriptor {} failed ({})", cursor, p.status);
                bridge::REG_FAILED.store(true, Ordering::Release);
                return;
            }
            unsafe { continue_registration(gatts_if, cursor) };
        }
        esp_gatts_cb_event_t_ESP_GATTS_CONNECT_EVT => {
            let p = unsafe { &(*param).connect };
            bridge::CONN_ID.store(p.conn_id as u32, Ordering::Relaxed);
            bridge::CONNECTED.store(true, Ordering::Release);
            log::info!("BLE GATTS: client connected (conn_id={})", p.conn_id);

            let interval = bridge::CONN_INTERVAL.load(Ordering::Relaxed);
            let mut conn_params = esp_ble_conn_update_params_t {
                bda: p.remote_bda,
                min_int: interval,
                max_int: interval,
                latency: 0,
                timeout: bridge::SUPERVISION_TIMEOUT.load(Ordering::Relaxed),
            };
            unsafe { esp_ble_gap_update_conn_params(&mut conn_params) };
        }
        esp_gatts_cb_event_t_ESP_GATTS_DISCONNECT_EVT => {
            bridge::CONNECTED.store(false, Ordering::Release);
            log::info!("BLE GATTS: client disconnected");
            // Restart advertising after disconnect.
            unsafe { start_advertising() };
        }
        esp_gatts_cb_event_t_ESP_GATTS_WRITE_EVT => {
            let p = unsafe { &(*param).write };
            if p.is_prep {
                log::warn!("BLE GATTS: prepared write ignored (handle={})", p.handle);
                return;
            }
            let Some(attr) = AttributeId::ALL.into_iter().find(|id| {
                bridge::CHAR_HANDLES[id.index()].load(Ordering::Relaxed) == p.handle
            }) else {
                return;
            };
            let data = unsafe { core::slice::from_raw_parts(p.value, p.len as usize) };
            if let Ok(mut queue) = bridge::INBOUND.lock() {
                if queue.push_back(InboundWrite::new(attr, data)).is_err() {
                    log::warn!("BLE GATTS: inbound queue full, {:?} write dropped", attr);
                }
            }
        }
        _ => {}
    }
}

// ───────────────────────────────────────────────────────────────
// BLE adapter
// ───────────────────────────────────────────────────────────────

pub struct BleLink {
    state: BleState,
    device_name: heapless::String<32>,
    /// Simulation: readable value of every attribute.
    #[cfg(not(target_os = "espidf"))]
    sim_values: [Payload; AttributeId::COUNT],
    /// Simulation: remote writes waiting for the service.
    #[cfg(not(target_os = "espidf"))]
    sim_inbound: heapless::Deque<InboundWrite, INBOUND_QUEUE_LEN>,
    /// Simulation: notifications sent to the connected central.
    #[cfg(not(target_os = "espidf"))]
    sim_notifications: u32,
}

impl Default for BleLink {
    fn default() -> Self {
        Self::new()
    }
}

impl BleLink {
    pub fn new() -> Self {
        Self {
            state: BleState::Idle,
            device_name: heapless::String::new(),
            #[cfg(not(target_os = "espidf"))]
            sim_values: core::array::from_fn(|_| Payload::new()),
            #[cfg(not(target_os = "espidf"))]
            sim_inbound: heapless::Deque::new(),
            #[cfg(not(target_os = "espidf"))]
            sim_notifications: 0,
        }
    }

    pub fn state(&self) -> BleState {
        self.state
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn platform_begin(&mut self, config: &SystemConfig) -> Result<(), LinkError> {
        use core::sync::atomic::Ordering;
        use esp_idf_hal::delay::FreeRtos;
        use esp_idf_svc::sys::*;

        const REG_TIMEOUT_MS: u32 = 3000;
        const REG_POLL_MS: u32 = 10;

        fn check(ret: esp_err_t, what: &str, err: LinkError) -> Result<(), LinkError> {
            if ret != ESP_OK as i32 {
                log::error!("BLE: {} failed ({})", what, ret);
                return Err(err);
            }
            Ok(())
        }

        bridge::CONN_INTERVAL.store(config.conn_interval_units, Ordering::Relaxed);
        bridge::SUPERVISION_TIMEOUT.store(config.supervision_timeout_units, Ordering::Relaxed);
        bridge::REG_DONE.store(false, Ordering::Release);
        bridge::REG_FAILED.store(false, Ordering::Release);

        unsafe {
            // Release classic BT memory (BLE-only mode saves ~30 KB).
            esp_bt_controller_mem_release(esp_bt_mode_t_ESP_BT_MODE_CLASSIC_BT);

            let mut bt_cfg = esp_bt_controller_config_t::default();
            check(
                esp_bt_controller_init(&mut bt_cfg),
                "bt_controller_init",
                LinkError::StackInitFailed,
            )?;
            check(
                esp_bt_controller_enable(esp_bt_mode_t_ESP_BT_MODE_BLE),
                "bt_controller_enable",
                LinkError::StackInitFailed,
            )?;
            check(esp_bluedroid_init(), "bluedroid_init", LinkError::StackInitFailed)?;
            check(esp_bluedroid_enable(), "bluedroid_enable", LinkError::StackInitFailed)?;

            check(
                esp_ble_gap_register_callback(Some(ble_gap_event_handler)),
                "gap_register_callback",
                LinkError::StackInitFailed,
            )?;
            check(
                esp_ble_gatts_register_callback(Some(ble_gatts_event_handler)),
                "gatts_register_callback",
                LinkError::StackInitFailed,
            )?;
            check(
                esp_ble_gatts_app_register(0),
                "gatts_app_register",
                LinkError::RegistrationFailed,
            )?;

            let mut name = heapless::Vec::<u8, 33>::new();
            let _ = name.extend_from_slice(config.device_name.as_bytes());
            let _ = name.push(0);
            esp_ble_gap_set_device_name(name.as_ptr() as *const _);
        }

        let mut waited = 0;
        while !bridge::REG_DONE.load(Ordering::Acquire) {
            if bridge::REG_FAILED.load(Ordering::Acquire) || waited >= REG_TIMEOUT_MS {
                log::error!("BLE: attribute registration did not complete");
                return Err(LinkError::RegistrationFailed);
            }
            FreeRtos::delay_ms(REG_POLL_MS);
            waited += REG_POLL_MS;
        }

        info!(
            "BLE(espidf): Bluedroid stack initialized as '{}'",
            self.device_name
        );
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin(&mut self, _config: &SystemConfig) -> Result<(), LinkError> {
        info!("BLE(sim): stack up as '{}'", self.device_name);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_advertise(&mut self) -> Result<(), LinkError> {
        use esp_idf_svc::sys::*;
        let mut adv_data = esp_ble_adv_data_t {
            set_scan_rsp: false,
            include_name: true,
            include_txpower: false,
            min_interval: 0x0006,
            max_interval: 0x0010,
            appearance: 0,
            manufacturer_len: 0,
            p_manufacturer_data: core::ptr::null_mut(),
            service_data_len: 0,
            p_service_data: core::ptr::null_mut(),
            service_uuid_len: bridge::ADV_SERVICE_UUID.len() as u16,
            p_service_uuid: bridge::ADV_SERVICE_UUID.as_ptr() as *mut u8,
            flag: (ESP_BLE_ADV_FLAG_GEN_DISC | ESP_BLE_ADV_FLAG_BREDR_NOT_SPT) as u8,
        };
        // Advertising starts from the GAP handler once the data is set.
        let ret = unsafe { esp_ble_gap_config_adv_data(&mut adv_data) };
        if ret != ESP_OK as i32 {
            log::error!("BLE: config_adv_data failed ({})", ret);
            return Err(LinkError::AdvertiseFailed);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_advertise(&mut self) -> Result<(), LinkError> {
        info!(
            "BLE(sim): advertising '{}' (service {:032x})",
            self.device_name,
            crate::gatt::attributes::THERAPY_SERVICE_UUID
        );
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_publish(&mut self, attr: AttributeId, value: &[u8], notify: bool) {
        use core::sync::atomic::Ordering;
        use esp_idf_svc::sys::*;

        let handle = bridge::CHAR_HANDLES[attr.index()].load(Ordering::Relaxed);
        if handle == 0 {
            return;
        }
        unsafe {
            esp_ble_gatts_set_attr_value(handle, value.len() as u16, value.as_ptr());
            if notify && bridge::CONNECTED.load(Ordering::Acquire) {
                esp_ble_gatts_send_indicate(
                    bridge::GATTS_IF.load(Ordering::Relaxed) as esp_gatt_if_t,
                    bridge::CONN_ID.load(Ordering::Relaxed) as u16,
                    handle,
                    value.len() as u16,
                    value.as_ptr() as *mut u8,
                    false,
                );
            }
        }
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_publish(&mut self, attr: AttributeId, value: &[u8], notify: bool) {
        let slot = &mut self.sim_values[attr.index()];
        slot.clear();
        let _ = slot.extend_from_slice(&value[..value.len().min(MAX_PAYLOAD_LEN)]);
        if notify && self.state == BleState::Connected {
            self.sim_notifications = self.sim_notifications.wrapping_add(1);
        }
    }

    // ── Simulation hooks ──────────────────────────────────────

    /// Simulation: a central connected.
    #[cfg(not(target_os = "espidf"))]
    pub fn on_central_connected(&mut self) {
        info!("BLE(sim): central connected");
        self.state = BleState::Connected;
    }

    /// Simulation: the central went away; advertising resumes.
    #[cfg(not(target_os = "espidf"))]
    pub fn on_central_disconnected(&mut self) {
        info!("BLE(sim): central disconnected");
        if self.state == BleState::Connected {
            self.state = BleState::Advertising;
        }
    }

    /// Simulation: a central wrote `data` to the characteristic `uuid`.
    /// Returns `false` for unknown UUIDs or a full queue.
    ///
    /// Like Bluedroid's auto-response, a write within the characteristic's
    /// bounds lands in the readable value before the firmware sees it.
    #[cfg(not(target_os = "espidf"))]
    pub fn inject_write(&mut self, uuid: u128, data: &[u8]) -> bool {
        let Some(attr) = AttributeId::from_uuid(uuid) else {
            log::warn!("BLE(sim): write to unknown characteristic {:032x}", uuid);
            return false;
        };
        let spec = attr.spec();
        if spec.direction.writable() && data.len() <= spec.max_len {
            let slot = &mut self.sim_values[attr.index()];
            slot.clear();
            let _ = slot.extend_from_slice(data);
        }
        self.sim_inbound
            .push_back(InboundWrite::new(attr, data))
            .is_ok()
    }

    /// Simulation: what a central would read from `attr`.
    #[cfg(not(target_os = "espidf"))]
    pub fn read_value(&self, attr: AttributeId) -> &[u8] {
        &self.sim_values[attr.index()]
    }

    /// Simulation: notifications delivered so far.
    #[cfg(not(target_os = "espidf"))]
    pub fn notifications_sent(&self) -> u32 {
        self.sim_notifications
    }
}

// ───────────────────────────────────────────────────────────────
// Port implementations
// ───────────────────────────────────────────────────────────────

impl NotifyPort for BleLink {
    fn publish(&mut self, attr: AttributeId, value: &[u8], notify: bool) {
        self.platform_publish(attr, value, notify);
    }

    /// Bluedroid sends every notification it is handed.
    fn supports_forced_notify(&self) -> bool {
        cfg!(target_os = "espidf")
    }
}

impl LinkPort for BleLink {
    fn begin(&mut self, config: &SystemConfig, groups: &[Group]) -> Result<(), LinkError> {
        self.device_name = config.device_name.clone();
        for group in groups {
            info!(
                "BLE: registering {} service ({} handles)",
                group.name(),
                service_handle_count(*group)
            );
        }
        match self.platform_begin(config) {
            Ok(()) => {
                self.state = BleState::Registered;
                Ok(())
            }
            Err(e) => {
                self.state = BleState::Failed;
                Err(e)
            }
        }
    }

    fn advertise(&mut self) -> Result<(), LinkError> {
        if self.state == BleState::Failed {
            return Err(LinkError::AdvertiseFailed);
        }
        self.platform_advertise()?;
        if self.state != BleState::Connected {
            self.state = BleState::Advertising;
        }
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn poll_write(&mut self) -> Option<InboundWrite> {
        bridge::INBOUND.lock().ok()?.pop_front()
    }

    #[cfg(not(target_os = "espidf"))]
    fn poll_write(&mut self) -> Option<InboundWrite> {
        self.sim_inbound.pop_front()
    }

    #[cfg(target_os = "espidf")]
    fn is_connected(&self) -> bool {
        bridge::CONNECTED.load(core::sync::atomic::Ordering::Acquire)
    }

    #[cfg(not(target_os = "espidf"))]
    fn is_connected(&self) -> bool {
        self.state == BleState::Connected
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────
