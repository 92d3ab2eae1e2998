//! Maps persisted tables back onto named channels as time-domain traces.
//!
//! The viewer side of the codec: given one board's decoded record
//! ([`DeviceRecord`]), a reconstructed tick sequence and the channel-to-port
//! lookup from the device tree ([`ChannelView`]), [`RunViewer::get_traces`]
//! expands the digital bitfield column into per-line traces, splits the
//! analog matrix into per-connection traces, and keys both by the channel
//! names that read them. Trigger-class channels are collected separately so
//! the caller can build secondary-clock views recursively.

use indexmap::IndexMap;
use log::{debug, warn};
use ndarray::{Array1, Array2};

use crate::bitfield::{self, NUM_LINES};
use crate::channel::ChannelClass;
use crate::clock::{reconstruct_ticks, ClockSignal};
use crate::error::Result;

/// One reconstructed time-domain trace. All traces of a decode pass share
/// the same tick timestamps; digital traces use 0.0/1.0 levels.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub times: Array1<f64>,
    pub values: Array1<f64>,
}

/// One row of the channel-to-port lookup: a named channel of the device
/// tree, the physical connection it reads, and its class tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelView {
    pub name: String,
    pub parent_port: String,
    pub class: ChannelClass,
}

impl ChannelView {
    /// Builds a lookup row from an externally supplied class tag.
    ///
    /// # Errors
    /// [`crate::error::Error::UnexpectedChannelKind`] for a tag outside the
    /// known class set.
    pub fn new(name: &str, parent_port: &str, class_name: &str) -> Result<Self> {
        Ok(Self {
            name: name.to_string(),
            parent_port: parent_port.to_string(),
            class: ChannelClass::from_name(class_name)?,
        })
    }
}

/// The persisted state decoded from one board's table group. Absent tables
/// stay `None`; `analog_out_channels` holds the fully-qualified column names
/// in column order, empty when no analog table was persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeviceRecord {
    pub analog_outs: Option<Array2<f32>>,
    pub analog_out_channels: Vec<String>,
    pub digital_outs: Option<Array1<u32>>,
}

/// All traces reconstructed in one decode pass, plus the trigger-class
/// subset. Owned by the caller for the lifetime of one visualization pass;
/// nothing here is ever persisted back.
#[derive(Debug, Clone, PartialEq)]
pub struct TraceSet {
    pub traces: IndexMap<String, Trace>,
    pub triggers: IndexMap<String, Trace>,
}

/// Decodes one board's persisted run for visualization.
pub struct RunViewer {
    pub board_name: String,
    pub record: DeviceRecord,
    pub children: Vec<ChannelView>,
}

impl RunViewer {
    pub fn new(board_name: &str, record: DeviceRecord, children: Vec<ChannelView>) -> Self {
        Self {
            board_name: board_name.to_string(),
            record,
            children,
        }
    }

    /// Reconstructs per-channel traces from the persisted tables.
    ///
    /// The board cannot clock itself, so the caller supplies the sampled
    /// signal of the clock that drove it; its rising edges define the
    /// timestamps every trace shares. Channels whose parent port was not
    /// part of this compiled run are skipped: a channel may exist in the
    /// device tree without ever having been wired to an active line here.
    pub fn get_traces(&self, clock: Option<&ClockSignal>) -> Result<TraceSet> {
        let ticks = reconstruct_ticks(clock, &self.board_name)?;

        // Port-keyed traces straight from the persisted tables
        let mut port_traces: IndexMap<String, Trace> = IndexMap::new();
        if let Some(words) = &self.record.digital_outs {
            let lines = bitfield::unpack(words);
            for line in 0..NUM_LINES {
                let values = lines.row(line).mapv(|state| state as u8 as f64);
                port_traces.insert(
                    format!("port0/line{}", line),
                    Trace {
                        times: ticks.clone(),
                        values,
                    },
                );
            }
        }
        if let Some(matrix) = &self.record.analog_outs {
            assert!(
                matrix.ncols() == self.record.analog_out_channels.len(),
                "Analog matrix has {} columns but {} channel names",
                matrix.ncols(),
                self.record.analog_out_channels.len()
            );
            for (i, channel) in self.record.analog_out_channels.iter().enumerate() {
                // Column names are fully qualified; the connection is the last component
                let connection = channel.rsplit('/').next().unwrap_or(channel);
                port_traces.insert(
                    connection.to_string(),
                    Trace {
                        times: ticks.clone(),
                        values: matrix.column(i).mapv(f64::from),
                    },
                );
            }
        }
        debug!(
            "Decoded {} port traces for board {}",
            port_traces.len(),
            self.board_name
        );

        // Key by channel name through the device-tree lookup
        let mut traces = IndexMap::new();
        let mut triggers = IndexMap::new();
        for child in &self.children {
            match port_traces.get(&child.parent_port) {
                Some(trace) => {
                    if child.class == ChannelClass::Trigger {
                        triggers.insert(child.name.clone(), trace.clone());
                    }
                    traces.insert(child.name.clone(), trace.clone());
                }
                None => warn!(
                    "Channel {} reads {}, which is not part of this compiled run; skipping",
                    child.name, child.parent_port
                ),
            }
        }
        Ok(TraceSet { traces, triggers })
    }
}

#[cfg(test)]
mod test {
    use crate::clock::ClockSignal;
    use crate::error::Error;
    use crate::trace::*;
    use ndarray::array;

    fn two_tick_clock() -> ClockSignal {
        ClockSignal::new(array![0.0, 1.0, 2.0, 3.0], array![0, 1, 0, 1])
    }

    #[test]
    fn digital_lines_become_port_traces() {
        let record = DeviceRecord {
            digital_outs: Some(array![0b101u32, 0b010]),
            ..Default::default()
        };
        let children = vec![
            ChannelView::new("shutter", "port0/line0", "DigitalOut").unwrap(),
            ChannelView::new("mot_trigger", "port0/line1", "Trigger").unwrap(),
        ];
        let viewer = RunViewer::new("Dev1", record, children);
        let set = viewer.get_traces(Some(&two_tick_clock())).unwrap();

        assert_eq!(set.traces["shutter"].times, array![1.0, 3.0]);
        assert_eq!(set.traces["shutter"].values, array![1.0, 0.0]);
        assert_eq!(set.traces["mot_trigger"].values, array![0.0, 1.0]);
        // The trigger-class channel also lands in the trigger subset
        assert_eq!(set.triggers.len(), 1);
        assert!(set.triggers.contains_key("mot_trigger"));
    }

    #[test]
    fn analog_columns_keyed_by_connection() {
        let record = DeviceRecord {
            analog_outs: Some(array![[0.5f32, -1.0], [1.5, -2.0]]),
            analog_out_channels: vec!["Dev1/ao0".to_string(), "Dev1/ao1".to_string()],
            ..Default::default()
        };
        let children = vec![ChannelView::new("coil_current", "ao1", "AnalogOut").unwrap()];
        let viewer = RunViewer::new("Dev1", record, children);
        let set = viewer.get_traces(Some(&two_tick_clock())).unwrap();

        assert_eq!(set.traces["coil_current"].values, array![-1.0, -2.0]);
        assert!(set.triggers.is_empty());
    }

    #[test]
    fn unwired_channels_are_skipped_silently() {
        let record = DeviceRecord::default();
        let children = vec![ChannelView::new("shutter", "port0/line0", "DigitalOut").unwrap()];
        let viewer = RunViewer::new("Dev1", record, children);
        let set = viewer.get_traces(Some(&two_tick_clock())).unwrap();
        // No digital table persisted: no line traces exist, the channel is skipped
        assert!(set.traces.is_empty());
    }

    #[test]
    fn missing_clock_aborts_decode() {
        let viewer = RunViewer::new("Dev1", DeviceRecord::default(), vec![]);
        assert!(matches!(
            viewer.get_traces(None),
            Err(Error::NoClockSource { .. })
        ));
    }
}
