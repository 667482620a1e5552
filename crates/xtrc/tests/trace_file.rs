//! End-to-end tests: record traces to disk and decode them back.

use xtrc::demo::{VM_STEP_FORMAT, VM_STEP_STRUCTDEF, VmStep, demo_header, write_demo};
use xtrc::{
    AccessWidth, Endianness, Error, Mapping, PROT_READ, RecordCompat, RecordTag, StepKind,
    StepLayout, Trace, TraceEvent, TraceHeader, TraceReader, TraceWriter, WriterOptions,
};

fn record_demo(endianness: Endianness, compat: RecordCompat) -> Vec<u8> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo.trc");
    let options = WriterOptions::new().with_compat(compat);
    let mut writer =
        TraceWriter::create_with_options(&path, &demo_header(endianness), options).unwrap();
    write_demo(&mut writer).unwrap();
    writer.close().unwrap();
    std::fs::read(&path).unwrap()
}

fn header_len(header: &TraceHeader) -> usize {
    6 + 10 + 2 + header.structdef.len() + 2 + header.format.len() + 1
}

#[test]
fn test_demo_record_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("demo.trc");
    let mut writer = TraceWriter::create(&path, &demo_header(Endianness::Little)).unwrap();
    write_demo(&mut writer).unwrap();
    assert_eq!(writer.stats().records, 10);
    writer.close().unwrap();

    let trace = Trace::read(&path).unwrap();
    assert_eq!(
        trace.tags(),
        vec![
            RecordTag::Map,
            RecordTag::Map,
            RecordTag::Step,
            RecordTag::Step,
            RecordTag::MemWrite,
            RecordTag::MemWrite,
            RecordTag::Step,
            RecordTag::MemRead,
            RecordTag::Step,
            RecordTag::Unmap,
        ]
    );

    let count = |tag| trace.tags().into_iter().filter(|t| *t == tag).count();
    assert_eq!(count(RecordTag::Step), 4);
    assert_eq!(count(RecordTag::Map), 2);
    assert_eq!(count(RecordTag::Unmap), 1);
    assert_eq!(count(RecordTag::MemWrite), 2);
    assert_eq!(count(RecordTag::MemRead), 1);
}

#[test]
fn test_demo_header_fields() {
    let data = record_demo(Endianness::Little, RecordCompat::Legacy);
    assert_eq!(&data[..6], b"XTRC\xFF\xFF");

    let trace = Trace::parse(&data).unwrap();
    assert_eq!(trace.header.layout, VmStep::layout());
    assert_eq!(trace.header.structdef, VM_STEP_STRUCTDEF);
    assert_eq!(trace.header.format, VM_STEP_FORMAT);
    assert_eq!(trace.endianness(), Endianness::Little);

    // First record starts right after the endianness byte.
    let first = header_len(&trace.header);
    assert_eq!(data[first - 1], 0);
    assert_eq!(&data[first..first + 4], b"MMAP");
}

#[test]
fn test_demo_string_table() {
    let data = record_demo(Endianness::Little, RecordCompat::Legacy);
    let mut reader = TraceReader::new(&data).unwrap();
    let mut assembly = Vec::new();
    while let Some(event) = reader.next_event().unwrap() {
        if let TraceEvent::Step(step) = event {
            assembly.push(step.assembly());
        }
    }

    assert_eq!(assembly, ["mov a, 42", "mov x, 43", "mov y, 44", "nop"]);
    let strings = reader.strings();
    assert_eq!(strings.len(), 8);
    let expected = ["mov", "a", "42", "x", "43", "y", "44", "nop"];
    for (id, literal) in (1u32..).zip(expected) {
        assert_eq!(strings.get(id), Some(literal), "string id {id}");
    }
}

#[test]
fn test_demo_memory_spells_noodle() {
    let trace = Trace::parse(&record_demo(Endianness::Little, RecordCompat::Legacy)).unwrap();

    let mut memory = [0u8; 64];
    let mut reads = Vec::new();
    for event in &trace.events {
        match event {
            TraceEvent::MemWrite(access) => {
                let bytes = access.bytes().unwrap();
                let start = usize::try_from(access.addr).unwrap();
                memory[start..start + bytes.len()].copy_from_slice(&bytes);
            }
            TraceEvent::MemRead(access) => reads.push(*access),
            _ => {}
        }
    }

    assert_eq!(&memory[42..48], b"Noodle");
    assert_eq!(reads.len(), 1);
    assert_eq!(reads[0].addr, 44);
    assert_eq!(reads[0].width, AccessWidth::Byte);
    assert_eq!(reads[0].value, Some(0x6F));
    assert_eq!(reads[0].bytes().unwrap(), b"o");
}

#[test]
fn test_demo_step_state() {
    for endianness in [Endianness::Little, Endianness::Big] {
        let trace = Trace::parse(&record_demo(endianness, RecordCompat::Legacy)).unwrap();
        let layout = trace.header.layout;
        let steps: Vec<_> = trace
            .events
            .iter()
            .filter_map(|event| match event {
                TraceEvent::Step(step) => Some(step),
                _ => None,
            })
            .collect();

        for (n, step) in (0u64..).zip(&steps) {
            let pc = step.field(layout.pc_offset, layout.pc_size, endianness);
            let counter = step.field(layout.step_offset, layout.step_size, endianness);
            assert_eq!(pc, Some(n), "{endianness:?} pc");
            assert_eq!(counter, Some(n), "{endianness:?} step counter");
            assert_eq!(step.kind(), Some(StepKind::Other));
            assert_eq!(step.machine_code.len(), 1);
        }
        assert_eq!(steps[3].state[10..13], [42, 43, 44]);
    }
}

#[test]
fn test_legacy_and_strict_map_records() {
    for (compat, expected_tid, expected_result) in [
        (RecordCompat::Legacy, 0, 8192),
        (RecordCompat::Strict, 7, 0),
    ] {
        let header = demo_header(Endianness::Little);
        let options = WriterOptions::new().with_compat(compat);
        let mut writer = TraceWriter::with_options(Vec::new(), &header, options).unwrap();
        writer
            .map(
                7,
                &Mapping {
                    addr: 0x1000,
                    len: 0x2000,
                    prot: PROT_READ,
                    ..Mapping::default()
                },
            )
            .unwrap();
        writer.unmap(7, 0x1000, 8192, 0).unwrap();
        let data = writer.into_inner().unwrap();

        let trace = Trace::parse(&data).unwrap();
        let TraceEvent::Map(map) = &trace.events[0] else {
            panic!("expected map, got {:?}", trace.events[0]);
        };
        assert_eq!(map.tid, expected_tid, "{compat:?}");
        assert_eq!(map.filename, None);
        let TraceEvent::Unmap(unmap) = &trace.events[1] else {
            panic!("expected unmap, got {:?}", trace.events[1]);
        };
        assert_eq!(unmap.tid, 7);
        assert_eq!(unmap.result, expected_result, "{compat:?}");
    }
}

#[test]
fn test_prefixed_strings_in_preamble() {
    let structdef = "x".repeat(300);
    let header = TraceHeader::new(StepLayout::new(4))
        .with_structdef(structdef.clone())
        .with_format("");
    let writer = TraceWriter::new(Vec::new(), &header).unwrap();
    let data = writer.into_inner().unwrap();

    // magic + five u16 fields, then u16 length and the bytes.
    assert_eq!(&data[16..18], &300u16.to_be_bytes());
    assert_eq!(&data[18..318], structdef.as_bytes());
    assert_eq!(&data[318..320], &[0, 0]);
    assert_eq!(data.len(), 321);
}

#[test]
fn test_single_byte_machine_code_and_fault() {
    let header = TraceHeader::new(StepLayout::new(2).with_pc(0, 2));
    let mut writer = TraceWriter::new(Vec::new(), &header).unwrap();
    writer
        .step(3, &[0x34, 0x12], &[0xC3], &["ret"], StepKind::Ret)
        .unwrap();
    writer.read_fault(3, 0xdead, AccessWidth::Word).unwrap();
    let data = writer.into_inner().unwrap();

    let trace = Trace::parse(&data).unwrap();
    let TraceEvent::Step(step) = &trace.events[0] else {
        panic!("expected step, got {:?}", trace.events[0]);
    };
    assert_eq!(step.tid, 3);
    assert_eq!(step.machine_code, [0xC3]);
    assert_eq!(step.kind(), Some(StepKind::Ret));
    assert_eq!(step.field(0, 2, Endianness::Little), Some(0x1234));

    let TraceEvent::MemRead(fault) = &trace.events[1] else {
        panic!("expected read, got {:?}", trace.events[1]);
    };
    assert_eq!(fault.value, None);
    assert_eq!(fault.width, AccessWidth::Word);

    // MEMR record: tag, tid, addr, value, size, flags.
    let record = &data[data.len() - 26..];
    assert_eq!(&record[..4], b"MEMR");
    assert_eq!(&record[16..24], &[0; 8]);
    assert_eq!(record[24], 4);
    assert_eq!(record[25] & 0x02, 0);
}

#[test]
fn test_rejected_step_leaves_trace_intact() {
    let header = TraceHeader::new(StepLayout::new(2));
    let mut writer = TraceWriter::new(Vec::new(), &header).unwrap();
    writer.step(0, &[0, 0], &[], &["a"], StepKind::Other).unwrap();

    let err = writer
        .step(0, &[0, 0, 0], &[], &["b"], StepKind::Other)
        .unwrap_err();
    assert!(matches!(err, Error::StepSizeMismatch { expected: 2, actual: 3 }));
    let err = writer
        .step(0, &[0, 0], &[], &["b\0"], StepKind::Other)
        .unwrap_err();
    assert!(matches!(err, Error::NulInToken(_)));
    assert!(!writer.is_poisoned());

    writer.step(0, &[0, 0], &[], &["b"], StepKind::Other).unwrap();
    let data = writer.into_inner().unwrap();

    let mut reader = TraceReader::new(&data).unwrap();
    while reader.next_event().unwrap().is_some() {}
    assert_eq!(reader.strings().get(1), Some("a"));
    assert_eq!(reader.strings().get(2), Some("b"));
    assert_eq!(reader.strings().len(), 2);
}
