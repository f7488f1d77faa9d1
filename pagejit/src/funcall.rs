//! Generated code calling back into a host function.

use std::convert::TryFrom;

use asm_chunks::x86_64::{CALL_RAX, EPILOGUE, INC_DWORD_RDI_DISP8, MOVABS_RAX, MOVABS_RDI, PROLOGUE};
use asm_chunks::CodeSink;
use exe_buf::NativeAddr;
use memoffset::offset_of;

use crate::{Error, Result};

pub const DECREMENT: i32 = 5;

/// State shared between the host and the generated code.
///
/// The generated code bumps `calls` itself and hands the whole struct
/// to [`decrement_all`].
#[repr(C)]
#[derive(Debug, Default)]
pub struct Tally {
    pub values: Vec<i32>,
    pub calls: u32,
}

impl Tally {
    pub fn new(values: Vec<i32>) -> Tally {
        Tally { values, calls: 0 }
    }
}

/// # Safety
/// `tally` must point to a live `Tally` nobody else is borrowing.
pub unsafe extern "C" fn decrement_all(tally: *mut Tally) {
    let tally = &mut *tally;
    log::info!("Ohhh, boy ...");
    for v in &mut tally.values {
        *v -= DECREMENT;
    }
}

fn calls_disp8() -> Result<u8> {
    let offset = offset_of!(Tally, calls);
    i8::try_from(offset)
        .map(|disp| disp as u8)
        .map_err(|_| Error::Displacement(offset))
}

/// Emits a function that does, in effect,
///
/// ```text
/// tally.calls += 1;
/// decrement_all(tally);
/// ```
///
/// The address of `tally` is baked into the code: it must stay where it
/// is, and must not be borrowed elsewhere, whenever the code runs.
pub fn build<S: CodeSink>(sink: &mut S, tally: *mut Tally) -> Result<()> {
    let disp = calls_disp8()?;

    sink.emit(&PROLOGUE)?;

    sink.emit(&MOVABS_RDI)?;
    sink.append_native_addr(NativeAddr::new(tally as *const Tally))?;

    sink.emit(&INC_DWORD_RDI_DISP8)?;
    sink.append(&[disp])?;

    sink.emit(&MOVABS_RAX)?;
    sink.append_native_addr(NativeAddr::new(decrement_all as *const ()))?;
    sink.emit(&CALL_RAX)?;

    sink.emit(&EPILOGUE)?;
    Ok(())
}
