use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Buffer(#[from] exe_buf::Error),

    #[error("message of {0} bytes doesn't fit a 32-bit length field")]
    MessageTooLong(usize),

    #[error("field offset {0} doesn't fit an 8-bit displacement")]
    Displacement(usize),

    #[error("{0} bytes of code don't fit in the address space")]
    CodeTooLarge(usize),

    #[error("generated code is x86-64, can't run it on this machine")]
    UnsupportedArch,

    #[error("can't disassemble generated code")]
    Disasm(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
