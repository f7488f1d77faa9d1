//! Executable memory buffers for generated machine code.
//!
//! An [`ExeBuf`] owns whole pages mapped read/write/execute. Code is
//! appended front to back, fields inside it can be patched once their
//! values are known, and the result is called as a function.

#[cfg(windows)] mod win;
#[cfg(windows)] use win as sys;

#[cfg(unix)] mod unix;
#[cfg(unix)] use unix as sys;

mod buf;
mod error;
pub mod page;
mod scalar;

pub use buf::ExeBuf;
pub use error::{Error, Result};
pub use scalar::{Endian, NativeAddr, Scalar};
