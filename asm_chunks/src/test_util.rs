use std::fmt::Write;

fn byte_literal(data: &[u8]) -> String {
    let mut s = String::with_capacity(3 + 4 * data.len());
    s.push_str("b\"");
    for &b in data {
        write!(&mut s, "\\x{:02x}", b).unwrap();
    }
    s.push('"');
    s
}

fn copy_pasteable(insns: &[binutils::Insn]) -> String {
    let width = insns.iter().map(|i| byte_literal(&i.bytes).len()).max().unwrap_or(0);
    let mut result = String::new();
    for insn in insns {
        let bytes = byte_literal(&insn.bytes);
        writeln!(
            &mut result, "    ({},{: <pad$} {:?}),",
            bytes, "", insn.text,
            pad = width - bytes.len(),
        ).unwrap();
    }
    result
}

/// Disassembles `code` with objdump and compares it instruction by
/// instruction. objdump's `# ...` annotations are not compared.
#[track_caller]
pub fn expect_disasm(code: &[u8], expected: &[(&[u8], &str)]) {
    let insns = binutils::Obj::from_bytes(code).unwrap().insns().unwrap();
    let got: Vec<(&[u8], &str)> = insns.iter()
        .map(|i| (i.bytes.as_slice(), i.text.as_str()))
        .collect();
    if got != expected {
        for (i, (g, e)) in got.iter().zip(expected).enumerate() {
            if g != e {
                println!("#{}      got: {:30}   {}", i, byte_literal(g.0), g.1);
                println!("#{} expected: {:30}   {}", i, byte_literal(e.0), e.1);
            }
        }
        if got.len() != expected.len() {
            println!("got {} instructions, expected {}", got.len(), expected.len());
        }
        println!("copy-pasteable result to update the test:");
        print!("{}", copy_pasteable(&insns));
        panic!("disassembly mismatch");
    }
}

/// Bytes GNU as produces for `asm` (Intel syntax).
pub fn assemble(asm: &str) -> Vec<u8> {
    binutils::Obj::from_asm(asm).unwrap().bytes().unwrap()
}
