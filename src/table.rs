//! Assembles a board's child channels into the persisted record sets and
//! writes them to a table store.
//!
//! One compile produces up to four record sets for a board: the analog-out
//! matrix, the digital bitfield column, the acquisition table and the
//! counter-acquisition table. A record set that has nothing to say is
//! omitted entirely rather than written empty; its companion attributes are
//! omitted with it. Column and row order is a deterministic function of the
//! sorted connection strings, never of insertion order, so repeated compiles
//! of the same channel set are byte-identical.
//!
//! Assembly is all-or-nothing: every record set is validated and built in
//! memory first ([`BoardTables::assemble`]), and only a fully assembled
//! result can be handed to a store ([`BoardTables::write_to`]). A validation
//! failure therefore never leaves a partial table behind.

use indexmap::IndexMap;
use log::debug;
use ndarray::{Array1, Array2};

use crate::bitfield::{self, NUM_LINES};
use crate::device::BaseBoard;
use crate::error::{Error, Result};
use crate::utils::{parse_connection, qualified_name};

/// Byte limit on every string field of a fixed-width acquisition record.
pub const MAX_FIELD_LEN: usize = 256;

/// One row of the acquisition table.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionRow {
    pub connection: String,
    pub label: String,
    pub start: f64,
    pub stop: f64,
    pub wait_label: String,
    pub scale_factor: f64,
    pub units: String,
}

/// One row of the counter-acquisition table. The CPT and trigger connections
/// of the owning counter are resolved to fully-qualified names and repeated
/// into every row.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterAcquisitionRow {
    pub connection: String,
    pub cpt_connection: String,
    pub trigger: String,
    pub label: String,
    pub start: f64,
    pub stop: f64,
    pub sample_freq: f64,
    pub wait_label: String,
}

/// The T x C analog-out matrix plus its column names, fully qualified, in
/// column order.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalogOutTable {
    pub data: Array2<f32>,
    pub channels: Vec<String>,
}

/// The digital bitfield column plus the board's fixed line-naming string
/// (`<MAX name>/port0/line0:31`).
#[derive(Debug, Clone, PartialEq)]
pub struct DigitalOutTable {
    pub words: Array1<u32>,
    pub lines: String,
}

/// Flattened acquisition windows plus the fully-qualified names of every
/// analog input channel, in sorted order.
#[derive(Debug, Clone, PartialEq)]
pub struct AcquisitionTable {
    pub rows: Vec<AcquisitionRow>,
    pub channels: Vec<String>,
}

/// Flattened counter acquisition windows plus the per-board channel name
/// lists and the board's acquisition rate.
#[derive(Debug, Clone, PartialEq)]
pub struct CounterAcquisitionTable {
    pub rows: Vec<CounterAcquisitionRow>,
    pub counter_channels: Vec<String>,
    pub cpt_channels: Vec<String>,
    pub trig_channels: Vec<String>,
    pub acquisition_rate: f64,
}

/// The complete assembled output of one board compile. Once assembled, the
/// record sets are immutable; [`BoardTables::write_to`] only reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardTables {
    pub analog_out: Option<AnalogOutTable>,
    pub digital_out: Option<DigitalOutTable>,
    pub acquisitions: Option<AcquisitionTable>,
    pub counter_acquisitions: Option<CounterAcquisitionTable>,

    pub max_name: String,
    pub acquisition_rate: f64,
    pub clock_terminal: String,
}

impl BoardTables {
    /// Assembles all record sets for `board`, with `n_samps` time steps.
    ///
    /// # Errors
    /// Any validation failure ([`Error::VoltageOutOfRange`],
    /// [`Error::FieldTooLong`], connection parse errors) aborts the whole
    /// assembly; nothing is produced.
    ///
    /// # Panics
    /// Panics if an output channel's sample array length differs from
    /// `n_samps`; the caller is responsible for handing in one consistent
    /// compile unit.
    pub fn assemble(board: &impl BaseBoard, n_samps: usize) -> Result<Self> {
        let tables = Self {
            analog_out: assemble_analog_out(board, n_samps)?,
            digital_out: assemble_digital_out(board, n_samps)?,
            acquisitions: assemble_acquisitions(board)?,
            counter_acquisitions: assemble_counter_acquisitions(board)?,

            max_name: board.max_name().to_string(),
            acquisition_rate: board.acquisition_rate(),
            clock_terminal: board.clock_terminal().to_string(),
        };
        debug!(
            "Assembled tables for board {}: analog_out={}, digital_out={}, acquisitions={}, counter_acquisitions={}",
            board.name(),
            tables.analog_out.is_some(),
            tables.digital_out.is_some(),
            tables.acquisitions.is_some(),
            tables.counter_acquisitions.is_some(),
        );
        Ok(tables)
    }

    /// Writes every assembled record set and its companion attributes to
    /// `store`. Absent record sets leave no table and no attribute behind.
    pub fn write_to(&self, store: &mut impl TableStore) {
        if let Some(analog) = &self.analog_out {
            store.create_table("ANALOG_OUTS", TableData::Float32Matrix(analog.data.clone()));
            store.set_attribute(
                "analog_out_channels",
                AttrValue::Str(analog.channels.join(", ")),
                AttrScope::DeviceProperties,
            );
        }
        if let Some(digital) = &self.digital_out {
            store.create_table("DIGITAL_OUTS", TableData::Uint32Column(digital.words.clone()));
            store.set_attribute(
                "digital_lines",
                AttrValue::Str(digital.lines.clone()),
                AttrScope::DeviceProperties,
            );
        }
        if let Some(acq) = &self.acquisitions {
            store.create_table("ACQUISITIONS", TableData::Acquisitions(acq.rows.clone()));
            store.set_attribute(
                "analog_in_channels",
                AttrValue::Str(acq.channels.join(", ")),
                AttrScope::DeviceProperties,
            );
        }
        if let Some(counter) = &self.counter_acquisitions {
            store.create_table(
                "COUNTER_ACQUISITIONS",
                TableData::CounterAcquisitions(counter.rows.clone()),
            );
            store.set_attribute(
                "counter_channels",
                AttrValue::Str(counter.counter_channels.join(", ")),
                AttrScope::DeviceProperties,
            );
            store.set_attribute(
                "cpt_channels",
                AttrValue::Str(counter.cpt_channels.join(", ")),
                AttrScope::DeviceProperties,
            );
            store.set_attribute(
                "trig_channels",
                AttrValue::Str(counter.trig_channels.join(", ")),
                AttrScope::DeviceProperties,
            );
            store.set_attribute(
                "counter_acquisition_rate",
                AttrValue::Float(counter.acquisition_rate),
                AttrScope::DeviceProperties,
            );
        }
        store.set_attribute(
            "MAX_name",
            AttrValue::Str(self.max_name.clone()),
            AttrScope::DeviceProperties,
        );
        store.set_attribute(
            "acquisition_rate",
            AttrValue::Float(self.acquisition_rate),
            AttrScope::DeviceProperties,
        );
        store.set_attribute(
            "clock_terminal",
            AttrValue::Str(self.clock_terminal.clone()),
            AttrScope::ConnectionTableProperties,
        );
    }
}

fn assert_samps(connection: &str, len: usize, n_samps: usize) {
    assert!(
        len == n_samps,
        "Channel {} holds {} samples while the compile unit spans {} steps",
        connection,
        len,
        n_samps
    );
}

fn assemble_analog_out(board: &impl BaseBoard, n_samps: usize) -> Result<Option<AnalogOutTable>> {
    let mut analogs = board.analog_out_channels();
    // Both dimensions must be nonzero for the matrix to exist
    if analogs.is_empty() || n_samps == 0 {
        return Ok(None);
    }
    analogs.sort_unstable_by(|a, b| a.connection.cmp(&b.connection));

    let mut data = Array2::<f32>::zeros((n_samps, analogs.len()));
    let mut channels = Vec::with_capacity(analogs.len());
    for (i, chan) in analogs.iter().enumerate() {
        assert_samps(&chan.connection, chan.samples.len(), n_samps);
        for &value in chan.samples.iter() {
            if !(-10.0..=10.0).contains(&value) {
                return Err(Error::VoltageOutOfRange {
                    connection: chan.connection.clone(),
                    value,
                });
            }
        }
        data.column_mut(i).assign(&chan.samples.mapv(|v| v as f32));
        channels.push(qualified_name(board.max_name(), &chan.connection));
    }
    Ok(Some(AnalogOutTable { data, channels }))
}

fn assemble_digital_out(board: &impl BaseBoard, n_samps: usize) -> Result<Option<DigitalOutTable>> {
    let digitals = board.digital_out_channels();
    if digitals.is_empty() {
        return Ok(None);
    }
    let mut lines = IndexMap::with_capacity(digitals.len());
    for chan in &digitals {
        assert_samps(&chan.connection, chan.samples.len(), n_samps);
        let addr = parse_connection(&chan.connection)?;
        lines.insert(addr.line, chan.samples.view());
    }
    let words = bitfield::pack(&lines, n_samps);
    let lines = format!("{}/port0/line0:{}", board.max_name(), NUM_LINES - 1);
    Ok(Some(DigitalOutTable { words, lines }))
}

fn check_field(field: &'static str, connection: &str, value: &str) -> Result<()> {
    if value.len() > MAX_FIELD_LEN {
        return Err(Error::FieldTooLong {
            field,
            connection: connection.to_string(),
            len: value.len(),
        });
    }
    Ok(())
}

fn assemble_acquisitions(board: &impl BaseBoard) -> Result<Option<AcquisitionTable>> {
    let mut inputs = board.analog_in_channels();
    inputs.sort_unstable_by(|a, b| a.connection.cmp(&b.connection));
    let n_rows: usize = inputs.iter().map(|chan| chan.acquisitions.len()).sum();
    if n_rows == 0 {
        return Ok(None);
    }

    let mut rows = Vec::with_capacity(n_rows);
    let mut channels = Vec::with_capacity(inputs.len());
    for chan in &inputs {
        channels.push(qualified_name(board.max_name(), &chan.connection));
        for acq in &chan.acquisitions {
            check_field("connection", &chan.connection, &chan.connection)?;
            check_field("label", &chan.connection, &acq.label)?;
            check_field("wait_label", &chan.connection, &acq.wait_label)?;
            check_field("units", &chan.connection, &acq.units)?;
            rows.push(AcquisitionRow {
                connection: chan.connection.clone(),
                label: acq.label.clone(),
                start: acq.start_time,
                stop: acq.end_time,
                wait_label: acq.wait_label.clone(),
                scale_factor: acq.scale_factor,
                units: acq.units.clone(),
            });
        }
    }
    Ok(Some(AcquisitionTable { rows, channels }))
}

fn assemble_counter_acquisitions(
    board: &impl BaseBoard,
) -> Result<Option<CounterAcquisitionTable>> {
    let mut counters = board.counter_channels();
    // Sorted with the same ordering rule as analog and input channels
    counters.sort_unstable_by(|a, b| a.connection.cmp(&b.connection));
    let n_rows: usize = counters.iter().map(|chan| chan.acquisitions.len()).sum();
    if n_rows == 0 {
        return Ok(None);
    }

    let mut rows = Vec::with_capacity(n_rows);
    let mut counter_channels = Vec::with_capacity(counters.len());
    let mut cpt_channels = Vec::with_capacity(counters.len());
    let mut trig_channels = Vec::with_capacity(counters.len());
    for chan in &counters {
        counter_channels.push(qualified_name(board.max_name(), &chan.connection));
        cpt_channels.push(qualified_name(board.max_name(), &chan.cpt_connection));
        trig_channels.push(qualified_name(board.max_name(), &chan.trigger));
        for acq in &chan.acquisitions {
            let cpt_connection = qualified_name(board.max_name(), &chan.cpt_connection);
            let trigger = qualified_name(board.max_name(), &chan.trigger);
            check_field("connection", &chan.connection, &chan.connection)?;
            check_field("cpt_connection", &chan.connection, &cpt_connection)?;
            check_field("trigger", &chan.connection, &trigger)?;
            check_field("label", &chan.connection, &acq.label)?;
            check_field("wait_label", &chan.connection, &acq.wait_label)?;
            rows.push(CounterAcquisitionRow {
                connection: chan.connection.clone(),
                cpt_connection,
                trigger,
                label: acq.label.clone(),
                start: acq.start_time,
                stop: acq.end_time,
                sample_freq: acq.sample_freq,
                wait_label: acq.wait_label.clone(),
            });
        }
    }
    Ok(Some(CounterAcquisitionTable {
        rows,
        counter_channels,
        cpt_channels,
        trig_channels,
        acquisition_rate: board.acquisition_rate(),
    }))
}

/// Scope under which a scalar attribute is stored alongside the tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrScope {
    DeviceProperties,
    ConnectionTableProperties,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Float(f64),
}

/// Rows handed to [`TableStore::create_table`].
#[derive(Debug, Clone, PartialEq)]
pub enum TableData {
    Float32Matrix(Array2<f32>),
    Uint32Column(Array1<u32>),
    Acquisitions(Vec<AcquisitionRow>),
    CounterAcquisitions(Vec<CounterAcquisitionRow>),
}

/// The persistence collaborator: a key/value + table store scoped to one
/// board's group. The codec only ever creates tables and sets attributes;
/// reading persisted runs back is the viewer's concern ([`crate::trace`]).
pub trait TableStore {
    fn create_table(&mut self, name: &str, data: TableData);
    fn set_attribute(&mut self, name: &str, value: AttrValue, scope: AttrScope);
}

/// In-memory [`TableStore`] used by tests and the demo binary.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    pub tables: IndexMap<String, TableData>,
    pub attributes: IndexMap<String, (AttrValue, AttrScope)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TableStore for MemoryStore {
    fn create_table(&mut self, name: &str, data: TableData) {
        self.tables.insert(name.to_string(), data);
    }

    fn set_attribute(&mut self, name: &str, value: AttrValue, scope: AttrScope) {
        self.attributes.insert(name.to_string(), (value, scope));
    }
}
