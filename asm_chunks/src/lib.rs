//! Fixed fragments of machine code and the sinks they are copied into.

use std::fmt;
use std::ops::Deref;

use exe_buf::{Endian, Error, ExeBuf, NativeAddr, Scalar};

pub mod x86_64;
#[cfg(all(test, target_arch = "x86_64"))] mod test_util;

/// A named, immutable sequence of instruction bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Chunk {
    pub name: &'static str,
    pub bytes: &'static [u8],
}

impl Chunk {
    pub const fn new(name: &'static str, bytes: &'static [u8]) -> Chunk {
        Chunk { name, bytes }
    }
}

impl Deref for Chunk {
    type Target = [u8];
    fn deref(&self) -> &[u8] {
        self.bytes
    }
}

impl AsRef<[u8]> for Chunk {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Something machine code is written into front to back.
///
/// Implemented by [`ExeBuf`] for code that is going to run, and by
/// `Vec<u8>` for code that is only built to be shown or copied later.
pub trait CodeSink {
    fn len(&self) -> usize;

    /// How many more bytes [`CodeSink::append`] accepts.
    fn remaining_capacity(&self) -> usize;

    fn append(&mut self, data: &[u8]) -> Result<(), Error>;

    /// Overwrites bytes that were already appended.
    fn patch<T: Scalar>(&mut self, offset: usize, value: T, endian: Endian) -> Result<(), Error>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn emit(&mut self, chunk: &Chunk) -> Result<(), Error> {
        self.append(chunk)
    }

    fn append_native_addr(&mut self, addr: NativeAddr) -> Result<(), Error> {
        self.append(&addr.to_ne_bytes())
    }
}

impl CodeSink for ExeBuf {
    fn len(&self) -> usize {
        self.bytes_used()
    }

    fn remaining_capacity(&self) -> usize {
        ExeBuf::remaining_capacity(self)
    }

    fn append(&mut self, data: &[u8]) -> Result<(), Error> {
        self.push(data)
    }

    fn patch<T: Scalar>(&mut self, offset: usize, value: T, endian: Endian) -> Result<(), Error> {
        ExeBuf::patch(self, offset, value, endian)
    }

    fn append_native_addr(&mut self, addr: NativeAddr) -> Result<(), Error> {
        self.push_native_addr(addr)
    }
}

impl CodeSink for Vec<u8> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn remaining_capacity(&self) -> usize {
        isize::MAX as usize - Vec::len(self)
    }

    fn append(&mut self, data: &[u8]) -> Result<(), Error> {
        self.extend_from_slice(data);
        Ok(())
    }

    fn patch<T: Scalar>(&mut self, offset: usize, value: T, endian: Endian) -> Result<(), Error> {
        let used = Vec::len(self);
        let end = offset.checked_add(T::WIDTH)
            .filter(|&end| end <= used)
            .ok_or(Error::PatchOutOfRange {
                offset,
                width: T::WIDTH,
                used,
            })?;
        value.write_to(&mut self[offset..end], endian);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::x86_64::*;

    fn build<S: CodeSink>(sink: &mut S) -> Result<(), Error> {
        sink.emit(&PROLOGUE)?;
        sink.emit(&MOVABS_RAX)?;
        let imm = sink.len();
        sink.append_native_addr(NativeAddr::from(0))?;
        sink.emit(&CALL_RAX)?;
        sink.emit(&EPILOGUE)?;
        sink.patch(imm, 0x1122_3344_5566_7788u64, Endian::Little)
    }

    #[test]
    fn vec_and_exe_buf_agree() {
        let mut v: Vec<u8> = Vec::new();
        build(&mut v).unwrap();
        let mut buf = ExeBuf::new().unwrap();
        build(&mut buf).unwrap();
        assert_eq!(buf.code().unwrap(), &v[..]);
        assert_eq!(CodeSink::len(&buf), v.len());
        assert_eq!(v.len(), PROLOGUE.len() + MOVABS_RAX.len() + 8 + CALL_RAX.len() + EPILOGUE.len());
    }

    #[test]
    fn vec_patch_out_of_range() {
        let mut v = vec![0u8; 3];
        assert!(matches!(
            CodeSink::patch(&mut v, 0, 0u32, Endian::Little),
            Err(Error::PatchOutOfRange { offset: 0, width: 4, used: 3 })
        ));
        assert_eq!(v, [0, 0, 0]);
    }

    #[test]
    fn exe_buf_overflow_through_sink() {
        let mut buf = ExeBuf::new().unwrap();
        let filler = vec![0x90; buf.capacity() - 1];
        buf.append(&filler).unwrap();
        assert!(matches!(buf.emit(&EPILOGUE), Err(Error::BufferOverflow { requested: 2, remaining: 1 })));
        assert!(buf.emit(&RET).is_ok());
    }

    #[test]
    fn remaining_capacity_through_sink() {
        let mut buf = ExeBuf::new().unwrap();
        buf.emit(&EPILOGUE).unwrap();
        assert_eq!(CodeSink::remaining_capacity(&buf), buf.capacity() - 2);

        let mut v: Vec<u8> = Vec::new();
        v.emit(&EPILOGUE).unwrap();
        assert_eq!(CodeSink::remaining_capacity(&v), isize::MAX as usize - 2);
    }

    #[test]
    fn chunk_is_its_bytes() {
        assert_eq!(&*EPILOGUE, &[0x5d, 0xc3]);
        assert_eq!(EPILOGUE.as_ref(), EPILOGUE.bytes);
        assert_eq!(EPILOGUE.to_string(), "epilogue");
    }
}
