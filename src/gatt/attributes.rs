//! Declarative attribute table for both GATT service groups.
//!
//! | Group       | Attribute        | UUID       | Perms           | Max |
//! |-------------|------------------|------------|-----------------|-----|
//! | Therapy     | elapsed time     | `…0002-…`  | Read+Notify     | 6   |
//! | Therapy     | intensity        | `…0003-…`  | Read+Write+Notify | 3 |
//! | Therapy     | target time      | `…0004-…`  | Read+Write+Notify | 6 |
//! | Therapy     | status           | `…0005-…`  | Read+Notify     | 20  |
//! | Therapy     | client timestamp | `…0006-…`  | Read+Write      | 20  |
//! | Therapy     | user id          | `…0007-…`  | Read+Write      | 50  |
//! | Device Info | device id        | `…0012-…`  | Read            | 50  |
//! | Device Info | location id      | `…0013-…`  | Read            | 3   |
//! | Device Info | battery          | `…0014-…`  | Read+Notify     | 3   |
//! | Device Info | firmware version | `…0015-…`  | Read            | 20  |
//!
//! All UUIDs share the `0000xxxx-710e-4a5b-8d75-3e5b444bc3cf` base.

use crate::gatt::codec::{BYTE_MAX_LEN, UINT_MAX_LEN};

// ───────────────────────────────────────────────────────────────
// UUIDs
// ───────────────────────────────────────────────────────────────

pub const THERAPY_SERVICE_UUID: u128 = 0x00000001_710e_4a5b_8d75_3e5b444bc3cf;
pub const DEVICE_INFO_SERVICE_UUID: u128 = 0x00000011_710e_4a5b_8d75_3e5b444bc3cf;

pub const CHAR_ELAPSED_TIME: u128 = 0x00000002_710e_4a5b_8d75_3e5b444bc3cf;
pub const CHAR_INTENSITY: u128 = 0x00000003_710e_4a5b_8d75_3e5b444bc3cf;
pub const CHAR_TARGET_TIME: u128 = 0x00000004_710e_4a5b_8d75_3e5b444bc3cf;
pub const CHAR_STATUS: u128 = 0x00000005_710e_4a5b_8d75_3e5b444bc3cf;
pub const CHAR_CLIENT_TIMESTAMP: u128 = 0x00000006_710e_4a5b_8d75_3e5b444bc3cf;
pub const CHAR_USER_ID: u128 = 0x00000007_710e_4a5b_8d75_3e5b444bc3cf;

pub const CHAR_DEVICE_ID: u128 = 0x00000012_710e_4a5b_8d75_3e5b444bc3cf;
pub const CHAR_LOCATION_ID: u128 = 0x00000013_710e_4a5b_8d75_3e5b444bc3cf;
pub const CHAR_BATTERY: u128 = 0x00000014_710e_4a5b_8d75_3e5b444bc3cf;
pub const CHAR_FIRMWARE_VERSION: u128 = 0x00000015_710e_4a5b_8d75_3e5b444bc3cf;

/// Characteristic User Description descriptor (0x2901).
pub const DESCRIPTOR_USER_DESCRIPTION: u16 = 0x2901;
/// Client Characteristic Configuration descriptor (0x2902).
pub const DESCRIPTOR_CLIENT_CONFIG: u16 = 0x2902;

// ───────────────────────────────────────────────────────────────
// Payload bounds
// ───────────────────────────────────────────────────────────────

pub const STATUS_MAX_LEN: usize = 20;
pub const CLIENT_TIMESTAMP_MAX_LEN: usize = 20;
pub const USER_ID_MAX_LEN: usize = 50;
pub const DEVICE_ID_MAX_LEN: usize = 50;
pub const FIRMWARE_VERSION_MAX_LEN: usize = 20;

/// Largest payload of any attribute in the table.
pub const MAX_PAYLOAD_LEN: usize = 50;

/// Stored attribute value.
pub type Payload = heapless::Vec<u8, MAX_PAYLOAD_LEN>;

// ───────────────────────────────────────────────────────────────
// Identity
// ───────────────────────────────────────────────────────────────

/// Every remotely visible attribute, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum AttributeId {
    ElapsedTime = 0,
    Intensity = 1,
    TargetTime = 2,
    Status = 3,
    ClientTimestamp = 4,
    UserId = 5,
    DeviceId = 6,
    LocationId = 7,
    Battery = 8,
    FirmwareVersion = 9,
}

impl AttributeId {
    /// Total number of attributes, used to size per-attribute arrays.
    pub const COUNT: usize = 10;

    pub const ALL: [Self; Self::COUNT] = [
        Self::ElapsedTime,
        Self::Intensity,
        Self::TargetTime,
        Self::Status,
        Self::ClientTimestamp,
        Self::UserId,
        Self::DeviceId,
        Self::LocationId,
        Self::Battery,
        Self::FirmwareVersion,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Static table row for this attribute.
    pub fn spec(self) -> &'static AttributeSpec {
        &ATTRIBUTE_TABLE[self.index()]
    }

    /// Reverse lookup used by link adapters that only know the UUID.
    pub fn from_uuid(uuid: u128) -> Option<Self> {
        ATTRIBUTE_TABLE.iter().find(|s| s.uuid == uuid).map(|s| s.id)
    }
}

/// Which operations a remote peer may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Read,
    Write,
    ReadWrite,
    ReadNotify,
    ReadWriteNotify,
}

impl Direction {
    pub fn readable(self) -> bool {
        !matches!(self, Self::Write)
    }

    pub fn writable(self) -> bool {
        matches!(self, Self::Write | Self::ReadWrite | Self::ReadWriteNotify)
    }

    pub fn notifiable(self) -> bool {
        matches!(self, Self::ReadNotify | Self::ReadWriteNotify)
    }
}

/// How the stored bytes are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Decimal ASCII, up to six digits.
    Uint,
    /// Decimal ASCII, up to three digits.
    Byte,
    /// Raw UTF-8.
    Text,
}

/// Service grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Group {
    TherapyControl,
    DeviceInfo,
}

impl Group {
    pub const ALL: [Self; 2] = [Self::TherapyControl, Self::DeviceInfo];

    pub fn uuid(self) -> u128 {
        match self {
            Self::TherapyControl => THERAPY_SERVICE_UUID,
            Self::DeviceInfo => DEVICE_INFO_SERVICE_UUID,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::TherapyControl => "Therapy Control",
            Self::DeviceInfo => "Device Info",
        }
    }

    /// Attributes belonging to this group, in registration order.
    pub fn attributes(self) -> impl Iterator<Item = &'static AttributeSpec> {
        ATTRIBUTE_TABLE.iter().filter(move |s| s.group == self)
    }
}

// ───────────────────────────────────────────────────────────────
// Table
// ───────────────────────────────────────────────────────────────

/// One row of the attribute table.
#[derive(Debug)]
pub struct AttributeSpec {
    pub id: AttributeId,
    pub group: Group,
    pub uuid: u128,
    pub direction: Direction,
    pub encoding: Encoding,
    pub max_len: usize,
    /// Exposed through a 0x2901 descriptor; not behaviour-bearing.
    pub description: Option<&'static str>,
}

/// Indexed by `AttributeId as usize`.
pub static ATTRIBUTE_TABLE: [AttributeSpec; AttributeId::COUNT] = [
    AttributeSpec {
        id: AttributeId::ElapsedTime,
        group: Group::TherapyControl,
        uuid: CHAR_ELAPSED_TIME,
        direction: Direction::ReadNotify,
        encoding: Encoding::Uint,
        max_len: UINT_MAX_LEN,
        description: Some("Time Elapsed in Seconds"),
    },
    AttributeSpec {
        id: AttributeId::Intensity,
        group: Group::TherapyControl,
        uuid: CHAR_INTENSITY,
        direction: Direction::ReadWriteNotify,
        encoding: Encoding::Byte,
        max_len: BYTE_MAX_LEN,
        description: Some("Intensity Percentage"),
    },
    AttributeSpec {
        id: AttributeId::TargetTime,
        group: Group::TherapyControl,
        uuid: CHAR_TARGET_TIME,
        direction: Direction::ReadWriteNotify,
        encoding: Encoding::Uint,
        max_len: UINT_MAX_LEN,
        description: Some("Target Time in Seconds"),
    },
    AttributeSpec {
        id: AttributeId::Status,
        group: Group::TherapyControl,
        uuid: CHAR_STATUS,
        direction: Direction::ReadNotify,
        encoding: Encoding::Text,
        max_len: STATUS_MAX_LEN,
        description: None,
    },
    AttributeSpec {
        id: AttributeId::ClientTimestamp,
        group: Group::TherapyControl,
        uuid: CHAR_CLIENT_TIMESTAMP,
        direction: Direction::ReadWrite,
        encoding: Encoding::Text,
        max_len: CLIENT_TIMESTAMP_MAX_LEN,
        description: None,
    },
    AttributeSpec {
        id: AttributeId::UserId,
        group: Group::TherapyControl,
        uuid: CHAR_USER_ID,
        direction: Direction::ReadWrite,
        encoding: Encoding::Text,
        max_len: USER_ID_MAX_LEN,
        description: None,
    },
    AttributeSpec {
        id: AttributeId::DeviceId,
        group: Group::DeviceInfo,
        uuid: CHAR_DEVICE_ID,
        direction: Direction::Read,
        encoding: Encoding::Text,
        max_len: DEVICE_ID_MAX_LEN,
        description: None,
    },
    AttributeSpec {
        id: AttributeId::LocationId,
        group: Group::DeviceInfo,
        uuid: CHAR_LOCATION_ID,
        direction: Direction::Read,
        encoding: Encoding::Byte,
        max_len: BYTE_MAX_LEN,
        description: Some("Location Identifier"),
    },
    AttributeSpec {
        id: AttributeId::Battery,
        group: Group::DeviceInfo,
        uuid: CHAR_BATTERY,
        direction: Direction::ReadNotify,
        encoding: Encoding::Byte,
        max_len: BYTE_MAX_LEN,
        description: Some("Battery Level Percentage"),
    },
    AttributeSpec {
        id: AttributeId::FirmwareVersion,
        group: Group::DeviceInfo,
        uuid: CHAR_FIRMWARE_VERSION,
        direction: Direction::Read,
        encoding: Encoding::Text,
        max_len: FIRMWARE_VERSION_MAX_LEN,
        description: None,
    },
];
