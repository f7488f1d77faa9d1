use std::mem::size_of;

/// Byte order of a scalar written into the buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

impl Endian {
    /// Byte order of the machine we are running on.
    pub const NATIVE: Endian = if cfg!(target_endian = "little") {
        Endian::Little
    } else {
        Endian::Big
    };
}

/// Fixed-width integer that can be appended to or patched into a buffer.
/// The width of a patch site is the width of the type.
pub trait Scalar: Copy {
    const WIDTH: usize;

    /// `dst.len()` must be `WIDTH`.
    fn write_to(self, dst: &mut [u8], endian: Endian);
}

macro_rules! impl_scalar {
    ($($t:ty)*) => {$(
        impl Scalar for $t {
            const WIDTH: usize = size_of::<$t>();

            fn write_to(self, dst: &mut [u8], endian: Endian) {
                let bytes = match endian {
                    Endian::Little => self.to_le_bytes(),
                    Endian::Big => self.to_be_bytes(),
                };
                dst.copy_from_slice(&bytes);
            }
        }
    )*}
}

impl_scalar!(u8 u16 u32 u64 usize i8 i16 i32 i64 isize);

/// Entry address of a host function (or any other host object),
/// to be embedded into generated code.
///
/// ```ignore
/// extern "C" fn callback() {}
/// let addr = NativeAddr::new(callback as *const ());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NativeAddr(usize);

impl NativeAddr {
    pub fn new<T>(ptr: *const T) -> NativeAddr {
        NativeAddr(ptr as usize)
    }

    pub fn get(self) -> usize {
        self.0
    }

    /// Pointer-sized, in the byte order the CPU will load it with.
    pub fn to_ne_bytes(self) -> [u8; size_of::<usize>()] {
        self.0.to_ne_bytes()
    }
}

impl From<usize> for NativeAddr {
    fn from(addr: usize) -> Self {
        NativeAddr(addr)
    }
}
