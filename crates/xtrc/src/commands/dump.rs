//! Dump command.

use std::path::Path;

use rustc_hash::FxHashMap;
use tracing::error;
use xtrc::reader::{MapEvent, MemAccess, StepEvent};
use xtrc::{
    PROT_EXEC, PROT_READ, PROT_WRITE, RecordTag, StepKind, TraceEvent, TraceHeader, TraceReader,
};

use crate::cli::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::terminal;

/// Handle the `dump` command.
pub fn cmd_dump(input: &Path, summary: bool, limit: Option<usize>) -> i32 {
    let data = match std::fs::read(input) {
        Ok(data) => data,
        Err(e) => {
            error!(error = %e, path = %input.display(), "failed to read trace");
            terminal::error(&format!("Failed to read {}: {e}", input.display()));
            return EXIT_FAILURE;
        }
    };
    let mut reader = match TraceReader::new(&data) {
        Ok(reader) => reader,
        Err(e) => {
            error!(error = %e, path = %input.display(), "invalid trace header");
            terminal::error(&format!("Invalid trace header in {}: {e}", input.display()));
            return EXIT_FAILURE;
        }
    };

    let header = reader.header().clone();
    print_header(&header);

    let mut counts: FxHashMap<RecordTag, u64> = FxHashMap::default();
    let mut printed = 0usize;
    loop {
        if limit.is_some_and(|n| printed >= n) {
            break;
        }
        let offset = reader.position();
        let event = match reader.next_event() {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(e) => {
                terminal::error(&format!("decode failed at offset {offset}: {e}"));
                error!(error = %e, offset, "trace decode failed");
                return EXIT_FAILURE;
            }
        };
        *counts.entry(event.tag()).or_insert(0) += 1;
        if !summary {
            print_event(&header, offset, &event);
        }
        printed += 1;
    }

    if summary {
        let mut tags: Vec<_> = counts.into_iter().collect();
        tags.sort_unstable();
        for (tag, count) in tags {
            println!("{} {count}", terminal::tag(tag));
        }
        println!(
            "{} {} distinct strings",
            terminal::dim("--"),
            reader.strings().len()
        );
    }
    EXIT_SUCCESS
}

fn print_header(header: &TraceHeader) {
    let layout = &header.layout;
    terminal::info(&format!(
        "step size {} bytes, pc @{}+{}, step counter @{}+{}, {:?} endian",
        layout.size,
        layout.pc_offset,
        layout.pc_size,
        layout.step_offset,
        layout.step_size,
        header.endianness
    ));
    terminal::info(&format!("structdef: {}", header.structdef));
    terminal::info(&format!("format: {:?}", header.format));
}

fn print_event(header: &TraceHeader, offset: usize, event: &TraceEvent) {
    let detail = match event {
        TraceEvent::Step(step) => describe_step(header, step),
        TraceEvent::Map(map) => describe_map(map),
        TraceEvent::Unmap(unmap) => format!(
            "tid={} addr={:#x} len={:#x} result={:#x}",
            unmap.tid, unmap.addr, unmap.len, unmap.result
        ),
        TraceEvent::MemWrite(access) | TraceEvent::MemRead(access) => describe_mem(access),
    };
    println!(
        "{} {} {detail}",
        terminal::dim(format!("{offset:08x}")),
        terminal::tag(event.tag())
    );
}

fn describe_step(header: &TraceHeader, step: &StepEvent) -> String {
    let layout = &header.layout;
    let pc = step.field(layout.pc_offset, layout.pc_size, header.endianness);
    let counter = step.field(layout.step_offset, layout.step_size, header.endianness);
    let code: Vec<String> = step
        .machine_code
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect();
    let kind = step.kind().map_or("?", StepKind::name);
    format!(
        "tid={} step={} pc={} [{}] {} ({kind})",
        step.tid,
        counter.map_or_else(|| "?".to_string(), |n| format!("{n}")),
        pc.map_or_else(|| "?".to_string(), |pc| format!("{pc:#x}")),
        code.join(" "),
        step.assembly()
    )
}

fn describe_map(map: &MapEvent) -> String {
    let prot: String = [(PROT_READ, 'r'), (PROT_WRITE, 'w'), (PROT_EXEC, 'x')]
        .iter()
        .map(|&(bit, c)| if map.prot & bit != 0 { c } else { '-' })
        .collect();
    let mut out = format!(
        "tid={} addr={:#x} len={:#x} prot={prot} flags={:#x} off={:#x} fd={} result={:#x}",
        map.tid, map.addr, map.len, map.flags, map.offset, map.fd, map.result
    );
    if let Some(name) = &map.filename {
        out.push_str(&format!(" {name:?}"));
    }
    out
}

fn describe_mem(access: &MemAccess) -> String {
    let head = format!(
        "tid={} addr={:#x} size={}",
        access.tid,
        access.addr,
        access.width.bytes()
    );
    match (access.value, access.bytes()) {
        (Some(value), Some(bytes)) => {
            let bytes: Vec<String> = bytes.iter().map(|b| format!("{b:02x}")).collect();
            format!("{head} value={value:#x} [{}]", bytes.join(" "))
        }
        _ => format!("{head} fault"),
    }
}
