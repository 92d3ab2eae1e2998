//! Connection-string utilities shared by the compile and decode paths.

use regex::Regex;

use crate::bitfield::NUM_LINES;
use crate::error::{Error, Result};

/// A parsed digital connection: physical port and line on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelAddress {
    pub port: u32,
    pub line: u32,
}

/// Parses a connection string of the form `port<number>/line<number>` into a
/// [`ChannelAddress`].
///
/// Only port 0 is addressable, and lines must lie below [`NUM_LINES`].
///
/// # Errors
/// - [`Error::InvalidConnectionFormat`] if the string does not match the
///   expected shape.
/// - [`Error::UnsupportedPort`] for any port other than 0.
/// - [`Error::LineOutOfRange`] for a line at or above [`NUM_LINES`].
///
/// # Example
/// ```
/// use niboard_backend::utils::parse_connection;
///
/// let addr = parse_connection("port0/line17").unwrap();
/// assert_eq!((addr.port, addr.line), (0, 17));
/// assert!(parse_connection("port1/line0").is_err());
/// ```
pub fn parse_connection(connection: &str) -> Result<ChannelAddress> {
    let re = Regex::new(r"^port(\d+)/line(\d+)$").unwrap();
    let invalid = || Error::InvalidConnectionFormat {
        connection: connection.to_string(),
    };
    let caps = re.captures(connection).ok_or_else(invalid)?;
    // A run of digits too long for u32 is still a malformed connection
    let port: u32 = caps[1].parse().map_err(|_| invalid())?;
    let line: u32 = caps[2].parse().map_err(|_| invalid())?;
    if port != 0 {
        return Err(Error::UnsupportedPort {
            connection: connection.to_string(),
            port,
        });
    }
    if line as usize >= NUM_LINES {
        return Err(Error::LineOutOfRange {
            connection: connection.to_string(),
            line,
        });
    }
    Ok(ChannelAddress { port, line })
}

/// Fully-qualified channel name as seen by the NI driver: `<MAX name>/<connection>`.
pub fn qualified_name(max_name: &str, connection: &str) -> String {
    format!("{}/{}", max_name, connection)
}
