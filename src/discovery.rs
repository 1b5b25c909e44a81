//! GATT identifiers of the fixture
//!
//! The connection collaborator uses these to find the fixture and its
//! characteristics. Commands go to [`CHARACTERISTIC_UUID`], status answers
//! arrive on [`NOTIFY_CHARACTERISTIC_UUID`].

use uuid::{Uuid, uuid};

pub const SERVICE_UUID: Uuid = uuid!("69400001-B5A3-F393-E0A9-E50E24DCCA99");
pub const CHARACTERISTIC_UUID: Uuid = uuid!("69400002-B5A3-F393-E0A9-E50E24DCCA99");
pub const NOTIFY_CHARACTERISTIC_UUID: Uuid = uuid!("69400003-B5A3-F393-E0A9-E50E24DCCA99");

pub const ADVERTISED_NAME: &str = "NEEWER-RGB660";

/// Check if an advertised local name belongs to a fixture
///
/// Trailing NULs and spaces are ignored.
pub fn is_fixture_advertisement(name: &str) -> bool {
    name.trim_end_matches(['\0', ' '])
        .eq_ignore_ascii_case(ADVERTISED_NAME)
}

/// Check if a characteristic is the command characteristic
pub fn is_command_characteristic(uuid: &Uuid) -> bool {
    *uuid == CHARACTERISTIC_UUID
}

/// Check if a characteristic is the status notification characteristic
pub fn is_notify_characteristic(uuid: &Uuid) -> bool {
    *uuid == NOTIFY_CHARACTERISTIC_UUID
}
