//! x86-64 fragments. Chunks ending in an opcode prefix (`MOVABS_*`)
//! expect the caller to append the immediate right after them.

use crate::Chunk;

/// push rbp; mov rbp, rsp
pub const PROLOGUE: Chunk = Chunk::new("prologue", &[
    0x55,
    0x48, 0x89, 0xe5,
]);

/// pop rbp; ret
pub const EPILOGUE: Chunk = Chunk::new("epilogue", &[
    0x5d,
    0xc3,
]);

pub const RET: Chunk = Chunk::new("ret", &[0xc3]);

/// movabs rax, imm64 (imm64 follows)
pub const MOVABS_RAX: Chunk = Chunk::new("movabs rax", &[0x48, 0xb8]);

/// movabs rdi, imm64 (imm64 follows)
pub const MOVABS_RDI: Chunk = Chunk::new("movabs rdi", &[0x48, 0xbf]);

pub const CALL_RAX: Chunk = Chunk::new("call rax", &[0xff, 0xd0]);

/// inc dword [rdi + disp8] (disp8 follows)
pub const INC_DWORD_RDI_DISP8: Chunk = Chunk::new("inc dword [rdi+disp8]", &[0xff, 0x47]);

/// write(1, <bytes right after this chunk>, len); ret
///
/// The 32-bit length at [`HELLO_LEN_OFFSET`] starts out as zero and
/// is meant to be patched once the message is appended.
#[cfg(not(target_os = "macos"))]
pub const HELLO_WRITE: Chunk = Chunk::new("hello write", &[
    // mov rax, 1 (write)
    0x48, 0xc7, 0xc0, 0x01, 0x00, 0x00, 0x00,
    // mov rdi, 1 (stdout)
    0x48, 0xc7, 0xc7, 0x01, 0x00, 0x00, 0x00,
    // lea rsi, [rip + 10] (first byte after the trailing ret)
    0x48, 0x8d, 0x35, 0x0a, 0x00, 0x00, 0x00,
    // mov rdx, <len>
    0x48, 0xc7, 0xc2, 0x00, 0x00, 0x00, 0x00,
    // syscall
    0x0f, 0x05,
    // ret
    0xc3,
]);

#[cfg(target_os = "macos")]
pub const HELLO_WRITE: Chunk = Chunk::new("hello write", &[
    // mov rax, 0x2000004 (write)
    0x48, 0xc7, 0xc0, 0x04, 0x00, 0x00, 0x02,
    0x48, 0xc7, 0xc7, 0x01, 0x00, 0x00, 0x00,
    0x48, 0x8d, 0x35, 0x0a, 0x00, 0x00, 0x00,
    0x48, 0xc7, 0xc2, 0x00, 0x00, 0x00, 0x00,
    0x0f, 0x05,
    0xc3,
]);

pub const HELLO_LEN_OFFSET: usize = 24;
