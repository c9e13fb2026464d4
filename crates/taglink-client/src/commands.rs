//! Builders for the standard reader command set.
//!
//! Each builder returns an unencoded [`Frame`]; pass it to
//! [`Client::send_command`](crate::Client::send_command) or encode it with
//! [`Frame::encode`]. The payload tables come from the reader-writer
//! protocol manual.

use bytes::Bytes;

use taglink_frame::Frame;

/// Read a ROM record.
pub const CMD_READ_ROM: u8 = 0x4F;
/// Write a reader control register.
pub const CMD_WRITE_REGISTER: u8 = 0x4E;
/// ISO 15693 Inventory2 round.
pub const CMD_INVENTORY2: u8 = 0x78;
/// Buzzer control.
pub const CMD_BUZZER: u8 = 0x42;
/// Carried by tag-read reply frames.
pub const CMD_TAG_DATA: u8 = 0x49;

/// ROM address of the firmware version record.
pub const ROM_VERSION_ADDR: u8 = 0x90;
/// Register selecting the active antenna.
pub const REG_ANTENNA: u8 = 0x9C;
/// Inventory2 detail flag requesting UID responses.
pub const INVENTORY_WITH_UID: u8 = 0xF0;

/// Query the firmware ROM version.
pub fn rom_version(address: u8) -> Frame {
    Frame::new(address, CMD_READ_ROM, Bytes::from_static(&[ROM_VERSION_ADDR]))
}

/// Put the reader into command mode: autonomous polling stops and the
/// reader answers explicit commands only.
pub fn command_mode(address: u8) -> Frame {
    Frame::new(
        address,
        CMD_WRITE_REGISTER,
        Bytes::from_static(&[0x00, 0x00, 0x00, 0x1C]),
    )
}

/// Select the active antenna (0-based).
pub fn select_antenna(address: u8, antenna: u8) -> Frame {
    Frame::new(address, CMD_WRITE_REGISTER, vec![REG_ANTENNA, antenna])
}

/// Start an Inventory2 round. The reader acknowledges with the number of
/// tags found, then reports each tag in a follow-up frame.
pub fn inventory2(address: u8) -> Frame {
    Frame::new(
        address,
        CMD_INVENTORY2,
        Bytes::from_static(&[INVENTORY_WITH_UID, 0x40, 0x01]),
    )
}

/// Sound or silence the buzzer.
pub fn buzzer(address: u8, on: bool) -> Frame {
    let tone: u8 = if on { 0x01 } else { 0x00 };
    Frame::new(address, CMD_BUZZER, vec![tone, 0x00])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_fill_documented_payload_tables() {
        let frame = rom_version(0x00);
        assert_eq!(frame.command, CMD_READ_ROM);
        assert_eq!(frame.payload.as_ref(), [0x90]);

        let frame = command_mode(0x00);
        assert_eq!(frame.command, CMD_WRITE_REGISTER);
        assert_eq!(frame.payload.as_ref(), [0x00, 0x00, 0x00, 0x1C]);

        let frame = select_antenna(0x00, 2);
        assert_eq!(frame.command, CMD_WRITE_REGISTER);
        assert_eq!(frame.payload.as_ref(), [0x9C, 0x02]);

        let frame = inventory2(0x00);
        assert_eq!(frame.command, CMD_INVENTORY2);
        assert_eq!(frame.payload.as_ref(), [0xF0, 0x40, 0x01]);

        let frame = buzzer(0x00, true);
        assert_eq!(frame.command, CMD_BUZZER);
        assert_eq!(frame.payload.as_ref(), [0x01, 0x00]);

        let frame = buzzer(0x00, false);
        assert_eq!(frame.payload.as_ref(), [0x00, 0x00]);
    }

    #[test]
    fn builders_carry_the_device_address() {
        assert_eq!(rom_version(0x07).address, 0x07);
        assert_eq!(select_antenna(0x03, 0).address, 0x03);
    }

    #[test]
    fn rom_version_known_wire_vector() {
        let wire = rom_version(0x00).encode().unwrap();
        assert_eq!(
            wire.as_ref(),
            [0x02, 0x00, 0x4F, 0x01, 0x90, 0x03, 0xE5, 0x0D]
        );
    }
}
