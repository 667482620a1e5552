//! Demonstration trace.
//!
//! A toy VM with three 8-bit registers runs four instructions:
//! `mov a 42`, `mov x 43`, `mov y 44`, `nop`. Two pages are mapped up front,
//! "Noodle" is stored at address 42 after the second step, one byte of it is
//! read back after the third, and everything is unmapped at the end.

use std::io::Write;

use xtrc_format::{
    Endianness, MAP_ANONYMOUS, MAP_FIXED, MAP_PRIVATE, PROT_READ, PROT_WRITE, StepKind,
    StepLayout, TraceHeader,
};

use crate::{Mapping, Result, TraceWriter};

/// Field description of [`VmStep`], as shown by viewers.
pub const VM_STEP_STRUCTDEF: &str = "u64 step; u16 pc; u8 a; u8 x; u8 y; u8 flags;";

/// Rendering template for [`VmStep`].
pub const VM_STEP_FORMAT: &str =
    "A=${a;x2} X=${x;x2} Y=${y;x2} FLAGS=${flags;x2}\nPC=${pc;x4}\n";

const VM_STEP_BYTES: usize = 14;

/// Register snapshot of the toy VM. Packed, no padding between fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VmStep {
    pub step: u64,
    pub pc: u16,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub flags: u8,
}

impl VmStep {
    #[allow(clippy::cast_possible_truncation)]
    pub const SIZE: u16 = VM_STEP_BYTES as u16;

    #[must_use]
    pub const fn layout() -> StepLayout {
        StepLayout::new(Self::SIZE)
            .with_pc(8, 2)
            .with_step_counter(0, 8)
    }

    /// Serialize in the given payload order.
    #[must_use]
    pub fn to_bytes(&self, endianness: Endianness) -> [u8; VM_STEP_BYTES] {
        let mut out = [0u8; VM_STEP_BYTES];
        out[0..8].copy_from_slice(&endianness.u64_bytes(self.step));
        out[8..10].copy_from_slice(&endianness.u16_bytes(self.pc));
        out[10] = self.a;
        out[11] = self.x;
        out[12] = self.y;
        out[13] = self.flags;
        out
    }
}

#[must_use]
pub fn demo_header(endianness: Endianness) -> TraceHeader {
    TraceHeader::new(VmStep::layout())
        .with_structdef(VM_STEP_STRUCTDEF)
        .with_format(VM_STEP_FORMAT)
        .with_endianness(endianness)
}

/// Record the demonstration run into an open writer.
pub fn write_demo<W: Write>(writer: &mut TraceWriter<W>) -> Result<()> {
    let order = writer.endianness();

    writer.map(
        0,
        &Mapping {
            addr: 0,
            len: 4096,
            prot: PROT_READ,
            flags: MAP_PRIVATE | MAP_ANONYMOUS | MAP_FIXED,
            ..Mapping::default()
        },
    )?;
    writer.map(
        0,
        &Mapping {
            addr: 4096,
            len: 4096,
            prot: PROT_READ | PROT_WRITE,
            flags: MAP_PRIVATE | MAP_ANONYMOUS,
            result: 4096,
            filename: Some("data"),
            ..Mapping::default()
        },
    )?;

    let mut state = VmStep::default();

    writer.step(
        0,
        &state.to_bytes(order),
        &[42],
        &["mov", "a", "42"],
        StepKind::Other,
    )?;
    state.a = 42;

    state.pc = 1;
    state.step = 1;
    writer.step(
        0,
        &state.to_bytes(order),
        &[43],
        &["mov", "x", "43"],
        StepKind::Other,
    )?;
    state.x = 43;

    // Stores belonging to step 1.
    writer.write_mem(0, 42, 0x646F_6F4Eu32)?;
    writer.write_mem(0, 46, 0x656Cu16)?;

    state.pc = 2;
    state.step = 2;
    writer.step(
        0,
        &state.to_bytes(order),
        &[44],
        &["mov", "y", "44"],
        StepKind::Other,
    )?;
    state.y = 44;

    // Load belonging to step 2.
    writer.read_mem(0, 44, 0x6Fu8)?;

    state.pc = 3;
    state.step = 3;
    writer.step(0, &state.to_bytes(order), &[0], &["nop"], StepKind::Other)?;

    writer.unmap(0, 0, 8192, 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vm_step_bytes() {
        let state = VmStep {
            step: 1,
            pc: 0x0102,
            a: 0xA,
            x: 0xB,
            y: 0xC,
            flags: 0xF,
        };
        assert_eq!(
            state.to_bytes(Endianness::Little),
            [1, 0, 0, 0, 0, 0, 0, 0, 0x02, 0x01, 0xA, 0xB, 0xC, 0xF]
        );
        assert_eq!(
            state.to_bytes(Endianness::Big),
            [0, 0, 0, 0, 0, 0, 0, 1, 0x01, 0x02, 0xA, 0xB, 0xC, 0xF]
        );
    }

    #[test]
    fn test_layout_is_valid() {
        VmStep::layout().validate().unwrap();
        assert_eq!(demo_header(Endianness::Little).layout.size, 14);
    }
}
