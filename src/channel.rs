//! Channel kinds a board accepts as children, plus their acquisition records.
//!
//! A board owns four kinds of child channels, captured by the closed
//! [`ChildChannel`] enum: analog outputs and digital outputs carry one sample
//! per time step of the compile unit, while analog inputs and counters carry
//! a list of acquisition windows instead. Table assembly matches on the enum
//! exhaustively, so an unhandled kind cannot reach it; kind tags read back
//! from externally supplied data are checked through [`ChannelClass`].

use ndarray::Array1;

use crate::error::{Error, Result};

/// A labeled capture interval on an analog input channel.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionWindow {
    pub label: String,
    pub start_time: f64,
    pub end_time: f64,
    pub wait_label: String,
    pub scale_factor: f64,
    pub units: String,
}

/// A labeled capture interval on a counter channel, sampled at its own
/// frequency rather than scaled by a factor/units pair.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterAcquisitionWindow {
    pub label: String,
    pub start_time: f64,
    pub end_time: f64,
    pub sample_freq: f64,
    pub wait_label: String,
}

/// Analog output: one voltage per time step, bounded to +-10 V at assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalogOutChannel {
    pub connection: String,
    pub samples: Array1<f64>,
}

/// Digital output: one boolean per time step on a `port0/line<n>` connection.
#[derive(Debug, Clone, PartialEq)]
pub struct DigitalOutChannel {
    pub connection: String,
    pub samples: Array1<bool>,
}

/// Analog input: owns zero or more acquisition windows.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalogInChannel {
    pub connection: String,
    pub acquisitions: Vec<AcquisitionWindow>,
}

/// Counter input: like an analog input, but additionally wired to a CPT
/// connection and a trigger connection on the same board.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterChannel {
    pub connection: String,
    pub cpt_connection: String,
    pub trigger: String,
    pub acquisitions: Vec<CounterAcquisitionWindow>,
}

/// The closed set of channel kinds a board owns.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildChannel {
    AnalogOut(AnalogOutChannel),
    DigitalOut(DigitalOutChannel),
    AnalogIn(AnalogInChannel),
    Counter(CounterChannel),
}

impl ChildChannel {
    /// The connection string under which the board registers this channel.
    pub fn connection(&self) -> &str {
        match self {
            ChildChannel::AnalogOut(chan) => &chan.connection,
            ChildChannel::DigitalOut(chan) => &chan.connection,
            ChildChannel::AnalogIn(chan) => &chan.connection,
            ChildChannel::Counter(chan) => &chan.connection,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ChildChannel::AnalogOut(_) => "AnalogOut",
            ChildChannel::DigitalOut(_) => "DigitalOut",
            ChildChannel::AnalogIn(_) => "AnalogIn",
            ChildChannel::Counter(_) => "Counter",
        }
    }
}

/// Channel classes that may appear in a persisted device tree.
///
/// Covers the four kinds a board compiles plus `Trigger`, a digital-out
/// subclass whose traces the viewer collects separately to drive
/// secondary-clock views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelClass {
    AnalogOut,
    DigitalOut,
    AnalogIn,
    Counter,
    Trigger,
}

impl ChannelClass {
    /// Checks an externally supplied class tag against the known set.
    ///
    /// Persisted device trees carry class names as plain strings; anything
    /// outside the known set fails with [`Error::UnexpectedChannelKind`].
    pub fn from_name(kind: &str) -> Result<Self> {
        match kind {
            "AnalogOut" => Ok(ChannelClass::AnalogOut),
            "DigitalOut" => Ok(ChannelClass::DigitalOut),
            "AnalogIn" => Ok(ChannelClass::AnalogIn),
            "Counter" => Ok(ChannelClass::Counter),
            "Trigger" => Ok(ChannelClass::Trigger),
            _ => Err(Error::UnexpectedChannelKind {
                kind: kind.to_string(),
            }),
        }
    }
}
