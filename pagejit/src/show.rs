//! Human-readable views of generated code.

use std::fmt::Write;

use binutils::util::ByteSliceHex;
use binutils::Obj;

use crate::Result;

const BYTES_PER_ROW: usize = 16;

/// `Memory content: 40/4096 bytes used` followed by a hex dump.
pub fn memory(code: &[u8], capacity: usize) -> String {
    let mut s = format!("Memory content: {}/{} bytes used\n", code.len(), capacity);
    if !code.is_empty() {
        writeln!(s, "{}", code.hex_rows(BYTES_PER_ROW)).unwrap();
    }
    s
}

/// One line per instruction, as objdump sees it.
pub fn disasm(code: &[u8]) -> Result<String> {
    let mut s = String::new();
    let mut offset = 0;
    for insn in Obj::from_bytes(code)?.insns()? {
        write!(s, "{:>4x}:  {:<30}  {}", offset, insn.bytes.fmt_hex().to_string(), insn.text).unwrap();
        if let Some(comment) = &insn.comment {
            write!(s, "  # {}", comment).unwrap();
        }
        s.push('\n');
        offset += insn.bytes.len();
    }
    Ok(s)
}
