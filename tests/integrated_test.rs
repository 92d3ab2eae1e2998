use ndarray::array;

use niboard_backend::*;

// Rebuilds the viewer-side record from what a compile left in the store,
// the same way a visualization pass would.
fn record_from_store(store: &MemoryStore) -> DeviceRecord {
    DeviceRecord {
        analog_outs: match store.tables.get("ANALOG_OUTS") {
            Some(TableData::Float32Matrix(data)) => Some(data.clone()),
            _ => None,
        },
        analog_out_channels: match store.attributes.get("analog_out_channels") {
            Some((AttrValue::Str(names), _)) => names.split(", ").map(str::to_string).collect(),
            _ => vec![],
        },
        digital_outs: match store.tables.get("DIGITAL_OUTS") {
            Some(TableData::Uint32Column(words)) => Some(words.clone()),
            _ => None,
        },
    }
}

#[test]
fn compile_decode_round_trip() {
    let line0 = array![true, false, true, false];
    let line1 = array![false, false, true, true];
    let line31 = array![true, true, false, true];

    let mut board = Board::new("Dev1", "PFI0", None, 0.0);
    board.add_digital_out("port0/line0", line0.clone());
    board.add_digital_out("port0/line1", line1.clone());
    board.add_digital_out("port0/line31", line31.clone());
    board.add_analog_out("ao1", array![1.0, -1.0, 1.0, -1.0]);
    board.add_analog_out("ao0", array![0.0, 2.5, 5.0, 10.0]);

    let mut store = MemoryStore::new();
    board.generate_tables(4).unwrap().write_to(&mut store);

    let children = vec![
        ChannelView::new("shutter", "port0/line0", "DigitalOut").unwrap(),
        ChannelView::new("mot_trigger", "port0/line1", "Trigger").unwrap(),
        ChannelView::new("repump", "port0/line31", "DigitalOut").unwrap(),
        ChannelView::new("coil_x", "ao0", "AnalogOut").unwrap(),
        ChannelView::new("coil_y", "ao1", "AnalogOut").unwrap(),
        // Defined in the device tree but never wired in this run
        ChannelView::new("spare", "ao7", "AnalogOut").unwrap(),
    ];
    let clock = ClockSignal::new(
        array![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0],
        array![0, 1, 0, 1, 0, 1, 0, 1],
    );
    let viewer = RunViewer::new("Dev1", record_from_store(&store), children);
    let set = viewer.get_traces(Some(&clock)).unwrap();

    // Every digital channel decodes back to exactly the booleans it was
    // compiled from
    for (name, samples) in [("shutter", &line0), ("mot_trigger", &line1), ("repump", &line31)] {
        let expect: Vec<f64> = samples.iter().map(|&s| if s { 1.0 } else { 0.0 }).collect();
        assert_eq!(set.traces[name].values.to_vec(), expect, "channel {}", name);
        assert_eq!(set.traces[name].times, array![1.0, 3.0, 5.0, 7.0]);
    }
    assert_eq!(set.traces["coil_x"].values, array![0.0, 2.5, 5.0, 10.0]);
    assert_eq!(set.traces["coil_y"].values, array![1.0, -1.0, 1.0, -1.0]);

    // The unwired channel is absent, not an error
    assert!(!set.traces.contains_key("spare"));

    // Trigger-class subset
    assert_eq!(set.triggers.keys().collect::<Vec<_>>(), vec!["mot_trigger"]);
}

#[test]
fn column_order_is_insertion_independent() {
    let mut forward = Board::new("Dev1", "PFI0", None, 0.0);
    forward.add_analog_out("ao0", array![1.0]);
    forward.add_analog_out("ao1", array![2.0]);
    forward.add_analog_out("ao2", array![3.0]);

    let mut backward = Board::new("Dev1", "PFI0", None, 0.0);
    backward.add_analog_out("ao2", array![3.0]);
    backward.add_analog_out("ao0", array![1.0]);
    backward.add_analog_out("ao1", array![2.0]);

    let mut store_a = MemoryStore::new();
    let mut store_b = MemoryStore::new();
    forward.generate_tables(1).unwrap().write_to(&mut store_a);
    backward.generate_tables(1).unwrap().write_to(&mut store_b);

    assert_eq!(store_a.tables, store_b.tables);
    assert_eq!(store_a.attributes, store_b.attributes);
}

#[test]
fn boards_without_digital_channels_leave_no_digital_record() {
    let mut board = Board::new("Dev1", "PFI0", None, 0.0);
    board.add_analog_out("ao0", array![0.0]);

    let mut store = MemoryStore::new();
    board.generate_tables(1).unwrap().write_to(&mut store);

    // Absence, not an empty table, signals "no digital outputs"
    assert!(!store.tables.contains_key("DIGITAL_OUTS"));
    assert!(!store.attributes.contains_key("digital_lines"));
    assert!(store.tables.contains_key("ANALOG_OUTS"));
}

#[test]
fn counter_rows_sorted_by_connection() {
    let window = |freq: f64| CounterAcquisitionWindow {
        label: "count".to_string(),
        start_time: 0.0,
        end_time: 1.0,
        sample_freq: freq,
        wait_label: String::new(),
    };
    // Counter rows follow the same sorted-connection ordering rule as
    // analog and input channels, regardless of insertion order
    let mut board = Board::new("Dev1", "PFI0", Some("Dev1MAX"), 250e3);
    board.add_counter("ctr2", "PFI10", "PFI11", vec![window(2.0)]);
    board.add_counter("ctr0", "PFI8", "PFI9", vec![window(0.0)]);
    board.add_counter("ctr1", "PFI12", "PFI13", vec![window(1.0)]);

    let mut store = MemoryStore::new();
    board.generate_tables(0).unwrap().write_to(&mut store);

    let rows = match store.tables.get("COUNTER_ACQUISITIONS") {
        Some(TableData::CounterAcquisitions(rows)) => rows,
        other => panic!("Expected counter acquisition rows, got {:?}", other),
    };
    let connections: Vec<&str> = rows.iter().map(|row| row.connection.as_str()).collect();
    assert_eq!(connections, vec!["ctr0", "ctr1", "ctr2"]);
    assert_eq!(rows[0].sample_freq, 0.0);
    assert_eq!(rows[2].sample_freq, 2.0);

    // Rows resolve the owning counter's CPT and trigger connections to
    // fully-qualified names
    assert_eq!(rows[0].cpt_connection, "Dev1MAX/PFI8");
    assert_eq!(rows[0].trigger, "Dev1MAX/PFI9");

    let (counter_attr, _) = store.attributes.get("counter_channels").unwrap();
    assert_eq!(
        *counter_attr,
        AttrValue::Str("Dev1MAX/ctr0, Dev1MAX/ctr1, Dev1MAX/ctr2".to_string())
    );
    let (rate, _) = store.attributes.get("counter_acquisition_rate").unwrap();
    assert_eq!(*rate, AttrValue::Float(250e3));
}

#[test]
fn acquisition_table_round_trip_attributes() {
    let mut board = Board::new("Dev1", "PFI0", None, 0.0);
    board.add_analog_in(
        "ai0",
        vec![AcquisitionWindow {
            label: "absorption".to_string(),
            start_time: 0.5,
            end_time: 1.5,
            wait_label: "wait_for_load".to_string(),
            scale_factor: 2.0,
            units: "V".to_string(),
        }],
    );

    let mut store = MemoryStore::new();
    board.generate_tables(0).unwrap().write_to(&mut store);

    let rows = match store.tables.get("ACQUISITIONS") {
        Some(TableData::Acquisitions(rows)) => rows,
        other => panic!("Expected acquisition rows, got {:?}", other),
    };
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].connection, "ai0");
    assert_eq!(rows[0].start, 0.5);
    assert_eq!(rows[0].stop, 1.5);
    assert_eq!(rows[0].scale_factor, 2.0);

    let (channels, _) = store.attributes.get("analog_in_channels").unwrap();
    assert_eq!(*channels, AttrValue::Str("Dev1/ai0".to_string()));
}
