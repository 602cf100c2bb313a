//! Wire packet framing.
//!
//! Two packet types go to the server, both terminated by a single `0x00`:
//!
//! ```text
//! auth:    0x01 | password bytes     | 0x00
//! command: 0x02 | opcode | params    | 0x00
//! ```
//!
//! Text is carried one byte per character so any byte value survives the trip. There is no
//! escaping: a parameter containing `0x00` will truncate the packet on the server side.

use crate::command;
use crate::RconError;

pub const AUTH_PACKET_TYPE: u8 = 0x01;
pub const COMMAND_PACKET_TYPE: u8 = 0x02;
pub const TERMINATOR: u8 = 0x00;

/// Substring in the server's reply that signals an accepted password.
pub const AUTH_SUCCESS_MARKER: &str = "Password Accepted";

/// Encodes text one byte per character. Characters above U+00FF keep only their low byte.
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| c as u32 as u8).collect()
}

/// Decodes bytes one character per byte, so every input byte maps to exactly one `char`.
pub fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|b| *b as char).collect()
}

pub fn build_auth_packet(password: &str) -> Vec<u8> {
    let mut buf = Vec::with_capacity(password.len() + 2);
    buf.push(AUTH_PACKET_TYPE);
    buf.extend(encode_latin1(password));
    buf.push(TERMINATOR);
    buf
}

/// Builds a command packet for a registered command name.
///
/// Fails with [`ErrorKind::InvalidCommand`](crate::ErrorKind::InvalidCommand) if the name is
/// not in the registry.
pub fn build_command_packet(name: &str, params: Option<&str>) -> crate::Result<Vec<u8>> {
    let opcode = command::code_for(name)
        .ok_or_else(|| RconError::InvalidCommand(format!("unknown command `{}`", name)))?;

    let params = params.unwrap_or("");
    let mut buf = Vec::with_capacity(params.len() + 3);
    buf.push(COMMAND_PACKET_TYPE);
    buf.push(opcode);
    buf.extend(encode_latin1(params));
    buf.push(TERMINATOR);
    Ok(buf)
}

/// Splits a command packet back into its opcode and parameter text.
///
/// Returns `None` if the buffer is not a terminated command packet.
pub fn decode_command_packet(buf: &[u8]) -> Option<(u8, String)> {
    match buf {
        [COMMAND_PACKET_TYPE, opcode, params @ .., TERMINATOR] => {
            Some((*opcode, decode_latin1(params)))
        }
        _ => None,
    }
}

pub fn decode_auth_packet(buf: &[u8]) -> Option<String> {
    match buf {
        [AUTH_PACKET_TYPE, password @ .., TERMINATOR] => Some(decode_latin1(password)),
        _ => None,
    }
}

/// Whether an auth reply signals success.
pub fn is_auth_accepted(reply: &str) -> bool {
    reply.contains(AUTH_SUCCESS_MARKER)
}
