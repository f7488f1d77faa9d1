//! Thin wrapper around GNU `as` and `objdump`, used to check
//! machine code against the system disassembler.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

pub mod util;

use util::ByteSliceHex;

pub struct Obj(tempfile::NamedTempFile);

impl Obj {
    fn path(&self) -> &Path {
        self.0.path()
    }

    fn assemble(source: &str) -> io::Result<Obj> {
        let obj = Obj(tempfile::NamedTempFile::new()?);
        let mut p = Command::new("as")
            .arg("--64")
            .arg("-o")
            .arg(obj.path())
            .stdin(Stdio::piped())
            .spawn()?;
        let mut stdin = p.stdin.take()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "as: no stdin"))?;
        stdin.write_all(source.as_bytes())?;
        drop(stdin);
        let status = p.wait()?;
        if !status.success() {
            return Err(io::Error::new(io::ErrorKind::Other, format!("as failed: {}", status)));
        }
        Ok(obj)
    }

    /// Intel syntax, no register prefixes.
    pub fn from_asm(asm: &str) -> io::Result<Obj> {
        Obj::assemble(&format!(".intel_syntax noprefix\n.text\n{}\n", asm))
    }

    pub fn from_bytes(bytes: &[u8]) -> io::Result<Obj> {
        let mut source = String::from(".text\n");
        for &b in bytes {
            source.push_str(&format!(".byte 0x{:02x}\n", b));
        }
        Obj::assemble(&source)
    }

    pub fn insns(&self) -> io::Result<Vec<Insn>> {
        let res = Command::new("objdump")
            .args(&["-d", "-M", "intel", "--insn-width=15"])
            .arg(self.path())
            .stderr(Stdio::inherit())
            .output()?;
        if !res.status.success() {
            return Err(io::Error::new(io::ErrorKind::Other, format!("objdump failed: {}", res.status)));
        }
        let dump = std::str::from_utf8(&res.stdout)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(parse_objdump(dump))
    }

    /// Machine code of the whole object, as disassembled.
    pub fn bytes(&self) -> io::Result<Vec<u8>> {
        Ok(self.insns()?.into_iter().flat_map(|insn| insn.bytes).collect())
    }
}

#[derive(PartialEq)]
pub struct Insn {
    pub bytes: Vec<u8>,
    pub text: String,
    /// What objdump prints after `#`, e.g. the target of a rip-relative operand.
    pub comment: Option<String>,
}

impl std::fmt::Debug for Insn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Insn")
            .field("bytes", &self.bytes.fmt_hex())
            .field("text", &self.text)
            .field("comment", &self.comment)
            .finish()
    }
}

// Only lines of the form "  addr:\tbytes\ttext" are instructions;
// headers and labels have no tabs.
fn parse_objdump(dump: &str) -> Vec<Insn> {
    dump.lines().filter_map(|line| {
        let mut it = line.split('\t');
        if !it.next()?.trim_end().ends_with(':') {
            return None;
        }
        let bytes = it.next()?
            .split_whitespace()
            .map(|b| u8::from_str_radix(b, 16))
            .collect::<Result<Vec<u8>, _>>()
            .ok()?;
        let full = it.next().unwrap_or("");
        let (text, comment) = match full.find('#') {
            Some(i) => (&full[..i], Some(full[i + 1..].trim().to_string())),
            None => (full, None),
        };
        Some(Insn {
            bytes,
            text: text.trim_end().to_string(),
            comment,
        })
    }).collect()
}
