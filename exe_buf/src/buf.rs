use std::io;
use std::mem::size_of;

use crate::error::{Error, Result};
use crate::page;
use crate::scalar::{Endian, NativeAddr, Scalar};
use crate::sys;

/// A block of read/write/execute memory filled front to back.
///
/// Bytes are appended at the cursor and can be patched afterwards as
/// long as they lie below it. The whole block is released exactly
/// once, either by [`ExeBuf::release`] or when the buffer is dropped.
///
/// Holds a raw pointer, so it is neither `Send` nor `Sync`: the code
/// must not be modified while something is running it.
#[derive(Debug)]
pub struct ExeBuf {
    start: *mut u8,
    page_size: usize,
    pages: usize,
    len: usize,
    released: bool,
}

impl ExeBuf {
    /// A single page.
    pub fn new() -> Result<ExeBuf> {
        ExeBuf::allocate(1)
    }

    pub fn allocate(pages: usize) -> Result<ExeBuf> {
        let page_size = page::page_size();
        let size = match pages.checked_mul(page_size) {
            Some(size) if pages > 0 => size,
            _ => return Err(Error::Allocation {
                pages,
                source: io::Error::new(io::ErrorKind::InvalidInput, "page count out of range"),
            }),
        };
        let start = sys::map_rwx(size).map_err(|source| Error::Allocation { pages, source })?;
        log::debug!("mapped {} page(s), {} bytes at {:p}", pages, size, start);
        Ok(ExeBuf {
            start,
            page_size,
            pages,
            len: 0,
            released: false,
        })
    }

    /// Enough whole pages to hold `size` bytes.
    pub fn reserve(size: usize) -> Result<ExeBuf> {
        ExeBuf::allocate(page::pages_for(size))
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn capacity(&self) -> usize {
        self.pages * self.page_size
    }

    pub fn bytes_used(&self) -> usize {
        self.len
    }

    pub fn remaining_capacity(&self) -> usize {
        self.capacity() - self.len
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    /// Everything written so far.
    pub fn code(&self) -> Result<&[u8]> {
        self.check_live()?;
        Ok(unsafe { std::slice::from_raw_parts(self.start, self.len) })
    }

    pub fn push_byte(&mut self, byte: u8) -> Result<()> {
        self.push(&[byte])
    }

    pub fn push(&mut self, data: &[u8]) -> Result<()> {
        self.claim(data.len())?.copy_from_slice(data);
        Ok(())
    }

    pub fn push_scalar<T: Scalar>(&mut self, value: T, endian: Endian) -> Result<()> {
        value.write_to(self.claim(T::WIDTH)?, endian);
        Ok(())
    }

    /// Appends a host address as a pointer-sized native-endian integer.
    /// The instructions loading and calling it are up to the caller.
    pub fn push_native_addr(&mut self, addr: NativeAddr) -> Result<()> {
        log::trace!("embedding native address {:#x}", addr.get());
        self.push(&addr.to_ne_bytes())
    }

    /// Overwrites `T::WIDTH` already written bytes at `offset`.
    /// The cursor doesn't move.
    pub fn patch<T: Scalar>(&mut self, offset: usize, value: T, endian: Endian) -> Result<()> {
        self.check_live()?;
        let end = offset.checked_add(T::WIDTH)
            .filter(|&end| end <= self.len)
            .ok_or(Error::PatchOutOfRange {
                offset,
                width: T::WIDTH,
                used: self.len,
            })?;
        log::trace!("patching {} byte(s) at offset {}", T::WIDTH, offset);
        let written = unsafe { std::slice::from_raw_parts_mut(self.start, self.len) };
        value.write_to(&mut written[offset..end], endian);
        Ok(())
    }

    /// Calls the start of the buffer as `extern "C" fn()`.
    ///
    /// # Safety
    /// The bytes written so far must be a complete, correctly returning
    /// function for the host CPU. A fault inside it takes the process down.
    pub unsafe fn execute(&self) -> Result<()> {
        let f: extern "C" fn() = self.as_fn()?;
        log::debug!("executing {} byte(s) at {:p}", self.len, self.start);
        f();
        Ok(())
    }

    /// Reinterprets the start of the buffer as the function pointer type `F`.
    ///
    /// # Safety
    /// Same as [`ExeBuf::execute`], and `F` must match the calling
    /// convention and signature of the generated code. The pointer must
    /// not be called after the buffer is released.
    ///
    /// # Panics
    /// If `F` is not pointer-sized, which rules out anything but a
    /// (thin) function pointer.
    pub unsafe fn as_fn<F: Copy>(&self) -> Result<F> {
        assert_eq!(size_of::<F>(), size_of::<*const u8>(), "F must be a function pointer");
        self.check_live()?;
        if self.len == 0 {
            return Err(Error::Empty);
        }
        Ok(std::mem::transmute_copy::<*mut u8, F>(&self.start))
    }

    /// Unmaps the block. Every later operation that needs the memory
    /// fails with [`Error::UseAfterRelease`], including a second release.
    pub fn release(&mut self) -> Result<()> {
        self.check_live()?;
        let size = self.capacity();
        self.released = true;
        self.pages = 0;
        self.len = 0;
        let res = unsafe { sys::unmap(self.start, size) };
        log::debug!("unmapped {} bytes at {:p}", size, self.start);
        res.map_err(|source| Error::Release { source })
    }

    fn check_live(&self) -> Result<()> {
        if self.released {
            return Err(Error::UseAfterRelease);
        }
        Ok(())
    }

    // Hands out the next `n` bytes and moves the cursor past them,
    // or fails without touching anything.
    fn claim(&mut self, n: usize) -> Result<&mut [u8]> {
        self.check_live()?;
        let remaining = self.remaining_capacity();
        if n > remaining {
            return Err(Error::BufferOverflow {
                requested: n,
                remaining,
            });
        }
        log::trace!("appending {} byte(s) at offset {}", n, self.len);
        let dst = unsafe { std::slice::from_raw_parts_mut(self.start.add(self.len), n) };
        self.len += n;
        Ok(dst)
    }
}

impl Drop for ExeBuf {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.release() {
            log::warn!("dropping executable buffer: {}", e);
        }
    }
}
