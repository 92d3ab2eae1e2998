//! Implements struct and methods corresponding to one NI board. See
//! [`BaseBoard`] for implementation details.
//!
//! A board is the compile unit of an experiment: the complete set of child
//! channels attached to one physical card, together with their sampled
//! values, processed atomically into one persisted table group. The
//! [`Board`] struct trivially implements the [`BaseBoard`] trait by
//! supplying field methods; all behavior lives in the trait's default
//! methods, with table generation itself in the [`table` module].
//!
//! [`table` module]: crate::table

use indexmap::IndexMap;

use crate::channel::*;
use crate::error::Result;
use crate::table::BoardTables;

/// The `BaseBoard` trait defines the operations and attributes of one NI
/// board within an experiment.
///
/// - **Field methods**: direct access to the board's identity (name, MAX
///   name, clock terminal, acquisition rate) and its channel registry.
/// - **Channel management**: [`BaseBoard::add_channel`] and the
///   kind-specific wrappers ([`BaseBoard::add_analog_out`] and friends)
///   register child channels under their connection strings.
/// - **Kind bucketing**: [`BaseBoard::analog_out_channels`],
///   [`BaseBoard::digital_out_channels`], [`BaseBoard::analog_in_channels`]
///   and [`BaseBoard::counter_channels`] filter the registry by kind.
/// - **Compilation**: [`BaseBoard::generate_tables`] assembles the persisted
///   record sets for the board.
pub trait BaseBoard {
    // Immutable accessors (getters)
    fn channels(&self) -> &IndexMap<String, ChildChannel>;
    fn name(&self) -> &str;
    fn max_name(&self) -> &str;
    fn clock_terminal(&self) -> &str;
    fn acquisition_rate(&self) -> f64;

    // Mutable accessors
    fn channels_(&mut self) -> &mut IndexMap<String, ChildChannel>;

    /// Registers a child channel under its connection string.
    ///
    /// # Panics
    /// Panics if a channel with the same connection is already registered on
    /// this board.
    fn add_channel(&mut self, chan: ChildChannel) {
        let connection = chan.connection();
        assert!(
            !self.channels().contains_key(connection),
            "Connection {} already registered on board {}. Registered connections are {:?}",
            connection,
            self.name(),
            self.channels().keys().collect::<Vec<_>>()
        );
        self.channels_().insert(connection.to_string(), chan);
    }

    fn add_analog_out(&mut self, connection: &str, samples: ndarray::Array1<f64>) {
        self.add_channel(ChildChannel::AnalogOut(AnalogOutChannel {
            connection: connection.to_string(),
            samples,
        }));
    }

    fn add_digital_out(&mut self, connection: &str, samples: ndarray::Array1<bool>) {
        self.add_channel(ChildChannel::DigitalOut(DigitalOutChannel {
            connection: connection.to_string(),
            samples,
        }));
    }

    fn add_analog_in(&mut self, connection: &str, acquisitions: Vec<AcquisitionWindow>) {
        self.add_channel(ChildChannel::AnalogIn(AnalogInChannel {
            connection: connection.to_string(),
            acquisitions,
        }));
    }

    fn add_counter(
        &mut self,
        connection: &str,
        cpt_connection: &str,
        trigger: &str,
        acquisitions: Vec<CounterAcquisitionWindow>,
    ) {
        self.add_channel(ChildChannel::Counter(CounterChannel {
            connection: connection.to_string(),
            cpt_connection: cpt_connection.to_string(),
            trigger: trigger.to_string(),
            acquisitions,
        }));
    }

    /// Returns references to all analog-out channels, in registration order.
    fn analog_out_channels(&self) -> Vec<&AnalogOutChannel> {
        self.channels()
            .values()
            .filter_map(|chan| match chan {
                ChildChannel::AnalogOut(chan) => Some(chan),
                _ => None,
            })
            .collect()
    }

    fn digital_out_channels(&self) -> Vec<&DigitalOutChannel> {
        self.channels()
            .values()
            .filter_map(|chan| match chan {
                ChildChannel::DigitalOut(chan) => Some(chan),
                _ => None,
            })
            .collect()
    }

    fn analog_in_channels(&self) -> Vec<&AnalogInChannel> {
        self.channels()
            .values()
            .filter_map(|chan| match chan {
                ChildChannel::AnalogIn(chan) => Some(chan),
                _ => None,
            })
            .collect()
    }

    fn counter_channels(&self) -> Vec<&CounterChannel> {
        self.channels()
            .values()
            .filter_map(|chan| match chan {
                ChildChannel::Counter(chan) => Some(chan),
                _ => None,
            })
            .collect()
    }

    /// Assembles the persisted record sets for this board.
    ///
    /// `n_samps` is the number of time steps of the compile unit, shared by
    /// every output channel; each output channel's sample array must have
    /// exactly this length. See [`BoardTables::assemble`].
    fn generate_tables(&self, n_samps: usize) -> Result<BoardTables>
    where
        Self: Sized,
    {
        BoardTables::assemble(self, n_samps)
    }
}

/// Represents one National Instruments (NI) board of an experiment.
///
/// # Fields
/// - `channels`: child channels registered on this board, keyed by
///   connection string.
/// - `name`: name of the board within the experiment.
/// - `max_name`: name of the board as seen by the NI driver; defaults to
///   `name` when not given explicitly. Fully-qualified channel names are
///   formed as `<max_name>/<connection>`.
/// - `clock_terminal`: the terminal the board's external sample clock
///   arrives on. A board is always clocked externally; the terminal
///   identifier is persisted so the run can be reconstructed later.
/// - `acquisition_rate`: sample rate (Hz) used for counter acquisitions.
pub struct Board {
    channels: IndexMap<String, ChildChannel>,

    name: String,
    max_name: String,
    clock_terminal: String,
    acquisition_rate: f64,
}

impl Board {
    /// Constructs a new `Board` with an empty channel registry.
    ///
    /// Supply `None` for `max_name` to reuse `name` as the driver-visible
    /// name.
    pub fn new(
        name: &str,
        clock_terminal: &str,
        max_name: Option<&str>,
        acquisition_rate: f64,
    ) -> Self {
        Self {
            channels: IndexMap::new(),

            name: name.to_string(),
            max_name: max_name.unwrap_or(name).to_string(),
            clock_terminal: clock_terminal.to_string(),
            acquisition_rate,
        }
    }
}

impl BaseBoard for Board {
    fn channels(&self) -> &IndexMap<String, ChildChannel> {
        &self.channels
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn max_name(&self) -> &str {
        &self.max_name
    }

    fn clock_terminal(&self) -> &str {
        &self.clock_terminal
    }

    fn acquisition_rate(&self) -> f64 {
        self.acquisition_rate
    }

    fn channels_(&mut self) -> &mut IndexMap<String, ChildChannel> {
        &mut self.channels
    }
}

#[cfg(test)]
mod test {
    use crate::device::*;
    use ndarray::array;

    #[test]
    fn max_name_defaults_to_board_name() {
        let board = Board::new("ni_card_0", "PFI0", None, 0.0);
        assert_eq!(board.max_name(), "ni_card_0");

        let board = Board::new("ni_card_0", "PFI0", Some("Dev3"), 0.0);
        assert_eq!(board.max_name(), "Dev3");
    }

    #[test]
    fn channels_bucketed_by_kind() {
        let mut board = Board::new("Dev1", "PFI0", None, 1000.0);
        board.add_analog_out("ao1", array![0.0]);
        board.add_analog_out("ao0", array![0.0]);
        board.add_digital_out("port0/line4", array![true]);
        board.add_analog_in("ai0", vec![]);
        board.add_counter("ctr0", "PFI8", "PFI9", vec![]);

        assert_eq!(board.channels().len(), 5);
        assert_eq!(board.analog_out_channels().len(), 2);
        assert_eq!(board.digital_out_channels().len(), 1);
        assert_eq!(board.analog_in_channels().len(), 1);
        assert_eq!(board.counter_channels().len(), 1);
    }

    #[test]
    #[should_panic(expected = "already registered")]
    fn duplicate_connection_panics() {
        let mut board = Board::new("Dev1", "PFI0", None, 0.0);
        board.add_digital_out("port0/line0", array![true]);
        board.add_digital_out("port0/line0", array![false]);
    }
}
