//! A greeting printed by a single `write` syscall from generated code.
//!
//! The message travels right behind the code, and the length operand
//! of the syscall is patched in once the message is appended.

use std::convert::TryFrom;

use asm_chunks::x86_64::{HELLO_LEN_OFFSET, HELLO_WRITE};
use asm_chunks::CodeSink;
use exe_buf::{page, Endian, ExeBuf};

use crate::{Error, Result};

pub fn greeting(name: &str) -> String {
    format!("Hello, {}!\n", name)
}

/// Appends the write template followed by `message` and fixes up the
/// length field. Returns the offset the template starts at.
///
/// Nothing is appended unless template and message fit together.
pub fn build<S: CodeSink>(sink: &mut S, message: &[u8]) -> Result<usize> {
    let len = u32::try_from(message.len()).map_err(|_| Error::MessageTooLong(message.len()))?;
    let requested = HELLO_WRITE.len() + message.len();
    let remaining = sink.remaining_capacity();
    if requested > remaining {
        return Err(exe_buf::Error::BufferOverflow { requested, remaining }.into());
    }
    let start = sink.len();
    sink.emit(&HELLO_WRITE)?;
    sink.append(message)?;
    sink.patch(start + HELLO_LEN_OFFSET, len, Endian::Little)?;
    log::debug!("{}-byte message behind {} at offset {}", len, HELLO_WRITE, start);
    Ok(start)
}

/// Machine code for `message`, not yet in executable memory.
pub fn machine_code(message: &[u8]) -> Result<Vec<u8>> {
    let mut code = Vec::with_capacity(HELLO_WRITE.len() + message.len());
    build(&mut code, message)?;
    Ok(code)
}

/// Whole pages big enough for `code_len` bytes of code.
pub fn estimate_memory_size(code_len: usize) -> Result<usize> {
    page::round_up_to_pages(code_len).ok_or(Error::CodeTooLarge(code_len))
}

/// Copies finished code into a freshly sized executable buffer.
pub fn load(code: &[u8]) -> Result<ExeBuf> {
    let size = estimate_memory_size(code.len())?;
    log::info!("{} bytes of code, mapping {} bytes", code.len(), size);
    let mut buf = ExeBuf::reserve(size)?;
    buf.push(code)?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGE: &[u8] = b"Hello, World!\n";

    fn len_field(code: &[u8]) -> u32 {
        let mut field = [0; 4];
        field.copy_from_slice(&code[HELLO_LEN_OFFSET..HELLO_LEN_OFFSET + 4]);
        u32::from_le_bytes(field)
    }

    #[test]
    fn greeting_text() {
        assert_eq!(greeting("World"), "Hello, World!\n");
        assert_eq!(greeting("World").len(), MESSAGE.len());
    }

    #[test]
    fn length_is_patched() {
        let mut buf = ExeBuf::new().unwrap();
        assert_eq!(build(&mut buf, MESSAGE).unwrap(), 0);
        let code = buf.code().unwrap();
        assert_eq!(code.len(), HELLO_WRITE.len() + MESSAGE.len());
        assert_eq!(len_field(code), 14);
        assert_eq!(&code[HELLO_WRITE.len()..], MESSAGE);
        // everything but the length field is the template
        assert_eq!(&code[..HELLO_LEN_OFFSET], &HELLO_WRITE[..HELLO_LEN_OFFSET]);
        assert_eq!(&code[HELLO_LEN_OFFSET + 4..HELLO_WRITE.len()], &HELLO_WRITE[HELLO_LEN_OFFSET + 4..]);
    }

    #[test]
    fn staged_and_direct_agree() {
        let staged = machine_code(MESSAGE).unwrap();
        let mut buf = ExeBuf::new().unwrap();
        build(&mut buf, MESSAGE).unwrap();
        assert_eq!(buf.code().unwrap(), &staged[..]);
        assert_eq!(load(&staged).unwrap().code().unwrap(), &staged[..]);
    }

    #[test]
    fn empty_message() {
        let code = machine_code(b"").unwrap();
        assert_eq!(code.len(), HELLO_WRITE.len());
        assert_eq!(len_field(&code), 0);
    }

    #[test]
    fn message_bigger_than_a_page() {
        let message = vec![b'!'; page::page_size() + 1];
        let mut buf = ExeBuf::new().unwrap();
        assert!(matches!(
            build(&mut buf, &message),
            Err(Error::Buffer(exe_buf::Error::BufferOverflow { .. }))
        ));
        assert_eq!(buf.bytes_used(), 0);

        let buf = load(&machine_code(&message).unwrap()).unwrap();
        assert_eq!(buf.pages(), 2);
    }

    #[test]
    fn memory_size_estimate() {
        let ps = page::page_size();
        assert_eq!(estimate_memory_size(0).unwrap(), ps);
        assert_eq!(estimate_memory_size(45).unwrap(), ps);
        assert_eq!(estimate_memory_size(ps).unwrap(), ps);
        assert_eq!(estimate_memory_size(ps + 1).unwrap(), 2 * ps);
        assert!(matches!(estimate_memory_size(usize::MAX), Err(Error::CodeTooLarge(_))));
    }

    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    #[test]
    fn says_hello() {
        let mut buf = ExeBuf::allocate(1).unwrap();
        build(&mut buf, MESSAGE).unwrap();
        assert_eq!(len_field(buf.code().unwrap()), 14);
        unsafe { buf.execute().unwrap() };
        buf.release().unwrap();
    }

    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    #[test]
    fn staged_says_hello() {
        let buf = load(&machine_code(greeting("staged").as_bytes()).unwrap()).unwrap();
        unsafe { buf.execute().unwrap() };
    }
}
