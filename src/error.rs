//! Error taxonomy for table assembly and trace reconstruction.
//!
//! Every variant is fatal to the enclosing compile or decode pass: each one
//! signals a structural defect in the input channel set or the persisted
//! file, never a transient condition. Messages carry the channel name and
//! the offending value so callers can surface them to the user unchanged.

use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid connection string {connection:?}: expected the form 'port<number>/line<number>'")]
    InvalidConnectionFormat { connection: String },

    /// Multi-port addressing is a known hardware restriction, not a parse
    /// failure; callers show this message to the user as-is.
    #[error(
        "Connection {connection:?} addresses port {port}. Ports > 0 on NI boards are not \
         implemented; please use port 0."
    )]
    UnsupportedPort { connection: String, port: u32 },

    #[error("Connection {connection:?} addresses line {line}, but boards expose lines 0 through 31")]
    LineOutOfRange { connection: String, line: u32 },

    #[error(
        "{connection} holds the value {value} V; outputs can only take values between -10 and 10 \
         Volts, the limit imposed by the board"
    )]
    VoltageOutOfRange { connection: String, value: f64 },

    #[error(
        "Field '{field}' of {connection} is {len} bytes long; table string fields are limited to \
         256 bytes"
    )]
    FieldTooLong {
        field: &'static str,
        connection: String,
        len: usize,
    },

    #[error("No clock passed to {board}. An NI board cannot clock itself and must be clocked by another device.")]
    NoClockSource { board: String },

    #[error("Got unexpected channel kind {kind:?}")]
    UnexpectedChannelKind { kind: String },
}
