use std::fmt;

pub trait ByteSliceHex {
    /// `[ 55 48 89 e5 ]` on one line.
    fn fmt_hex(&self) -> ByteSliceHexFormatter<'_>;

    /// `0x55 0x48 ...`, `per_row` bytes to a line.
    fn hex_rows(&self, per_row: usize) -> HexRows<'_>;
}

impl<T> ByteSliceHex for T
where T: std::ops::Deref<Target=[u8]> {
    fn fmt_hex(&self) -> ByteSliceHexFormatter<'_> {
        ByteSliceHexFormatter {
            bytes: self.deref(),
        }
    }

    fn hex_rows(&self, per_row: usize) -> HexRows<'_> {
        assert!(per_row > 0);
        HexRows {
            bytes: self.deref(),
            per_row,
        }
    }
}

pub struct ByteSliceHexFormatter<'a> {
    bytes: &'a [u8],
}

impl fmt::Display for ByteSliceHexFormatter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for &b in self.bytes {
            write!(f, " {:02x}", b)?;
        }
        f.write_str(" ]")
    }
}

impl fmt::Debug for ByteSliceHexFormatter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

pub struct HexRows<'a> {
    bytes: &'a [u8],
    per_row: usize,
}

impl fmt::Display for HexRows<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.bytes.chunks(self.per_row).enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            for (j, b) in row.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                write!(f, "0x{:02x}", b)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_slice_hex() {
        assert_eq!(format!("{}", (&b"\x42"[..]).fmt_hex()), "[ 42 ]");
        assert_eq!(format!("{}", vec![0x42u8, 0x0a].fmt_hex()), "[ 42 0a ]");
        assert_eq!(format!("{:?}", Vec::<u8>::new().fmt_hex()), "[ ]");
    }

    #[test]
    fn rows() {
        let code: Vec<u8> = vec![0x55, 0x48, 0x89, 0xe5, 0x5d, 0xc3, 0x90];
        assert_eq!(format!("{}", code.hex_rows(3)), "0x55 0x48 0x89\n0xe5 0x5d 0xc3\n0x90");
        assert_eq!(format!("{}", code.hex_rows(16)), "0x55 0x48 0x89 0xe5 0x5d 0xc3 0x90");
        assert_eq!(format!("{}", Vec::<u8>::new().hex_rows(16)), "");
    }
}
