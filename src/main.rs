use ndarray::array;

use niboard_backend::*;

fn main() {
    // Compile a small board: two digital lines and one analog ramp over
    // four time steps.
    let mut board = Board::new("Dev1", "PFI0", None, 1000.0);
    board.add_digital_out("port0/line0", array![true, false, true, false]);
    board.add_digital_out("port0/line4", array![false, true, true, false]);
    board.add_analog_out("ao0", array![0.0, 2.5, 5.0, 7.5]);

    let tables = board.generate_tables(4).unwrap();
    let mut store = MemoryStore::new();
    tables.write_to(&mut store);
    println!("Persisted tables: {:?}", store.tables.keys().collect::<Vec<_>>());

    // Decode the persisted run back into traces, clocked by an external
    // signal that ticked once per step.
    let record = DeviceRecord {
        analog_outs: match store.tables.get("ANALOG_OUTS") {
            Some(TableData::Float32Matrix(data)) => Some(data.clone()),
            _ => None,
        },
        analog_out_channels: match store.attributes.get("analog_out_channels") {
            Some((AttrValue::Str(names), _)) => {
                names.split(", ").map(str::to_string).collect()
            }
            _ => vec![],
        },
        digital_outs: match store.tables.get("DIGITAL_OUTS") {
            Some(TableData::Uint32Column(words)) => Some(words.clone()),
            _ => None,
        },
    };
    let children = vec![
        ChannelView::new("probe_shutter", "port0/line0", "DigitalOut").unwrap(),
        ChannelView::new("camera_trigger", "port0/line4", "Trigger").unwrap(),
        ChannelView::new("coil_current", "ao0", "AnalogOut").unwrap(),
    ];
    let clock = ClockSignal::new(
        array![0.0, 0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 3.5],
        array![0, 1, 0, 1, 0, 1, 0, 1],
    );
    let viewer = RunViewer::new("Dev1", record, children);
    let set = viewer.get_traces(Some(&clock)).unwrap();
    for (name, trace) in &set.traces {
        println!("{}: t={:?} v={:?}", name, trace.times, trace.values);
    }
    println!("Trigger-class channels: {:?}", set.triggers.keys().collect::<Vec<_>>());
}
