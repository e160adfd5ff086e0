use std::fmt::Write;

use crate::bytecode::{CompiledProgram, OpCode};
use crate::error::ScriptError;

// =============================================================================
// DISASSEMBLER - human-readable bytecode listings
// =============================================================================

/// Renders a compiled program as a text listing: the main function's
/// instruction stream with pool operands resolved inline, followed by the
/// constant pools and recorded includes.
pub fn disassemble(program: &CompiledProgram) -> Result<String, ScriptError> {
    let mut out = String::new();

    let _ = writeln!(
        out,
        "fn main ({} local{})",
        program.main.variable_count,
        if program.main.variable_count == 1 { "" } else { "s" }
    );
    disassemble_code(&mut out, &program.main.code, program)?;

    if !program.strings.is_empty() {
        let _ = writeln!(out, "strings:");
        for (index, text) in program.strings.iter().enumerate() {
            let _ = writeln!(out, "  {}: '{}'", index, text);
        }
    }
    if !program.numbers.is_empty() {
        let _ = writeln!(out, "numbers:");
        for (index, value) in program.numbers.iter().enumerate() {
            let _ = writeln!(out, "  {}: {}", index, value);
        }
    }
    if !program.includes.is_empty() {
        let _ = writeln!(out, "includes:");
        for include in &program.includes {
            if include.alias.is_empty() {
                let _ = writeln!(out, "  {}", include.name);
            } else {
                let _ = writeln!(out, "  {} as {}", include.name, include.alias);
            }
        }
    }

    Ok(out)
}

fn disassemble_code(
    out: &mut String,
    code: &[i32],
    program: &CompiledProgram,
) -> Result<(), ScriptError> {
    let mut ip = 0;

    while ip < code.len() {
        let op = OpCode::try_from(code[ip])?;

        match op.operand_count() {
            0 => {
                let _ = writeln!(out, "  {:04} {}", ip, op);
                ip += 1;
            }
            _ => {
                let operand = *code
                    .get(ip + 1)
                    .ok_or_else(|| ScriptError::vm("truncated instruction stream"))?;
                match resolve_operand(op, operand, program) {
                    Some(resolved) => {
                        let _ = writeln!(out, "  {:04} {} {} ; {}", ip, op, operand, resolved);
                    }
                    None => {
                        let _ = writeln!(out, "  {:04} {} {}", ip, op, operand);
                    }
                }
                ip += 2;
            }
        }
    }

    Ok(())
}

/// Pool-indexed operands resolve to their constant for the listing; slot and
/// immediate operands print as-is.
fn resolve_operand(op: OpCode, operand: i32, program: &CompiledProgram) -> Option<String> {
    match op {
        OpCode::PushString
        | OpCode::PushMemberValue
        | OpCode::PushMemberName
        | OpCode::AssignGlobal
        | OpCode::AssignModule => program
            .strings
            .get(operand as usize)
            .map(|text| format!("'{}'", text)),
        OpCode::PushNumber => program
            .numbers
            .get(operand as usize)
            .map(|value| value.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bytecode::Compiler;
    use crate::lexer::Tokenizer;
    use crate::parser::Parser;

    fn listing(source: &str) -> String {
        let mut tokenizer = Tokenizer::new(source, "test.cgs").unwrap();
        let program = Parser::new(&mut tokenizer).parse_program().unwrap();
        let compiled = Compiler::new().compile_program(&program).unwrap();
        disassemble(&compiled).unwrap()
    }

    #[test]
    fn test_listing_resolves_pool_operands() {
        let text = listing("a = 'hi'\nb = 2.5");

        assert!(text.contains("PushString 0 ; 'hi'"));
        assert!(text.contains("PushNumber 0 ; 2.5"));
        assert!(text.contains("AssignGlobal 1 ; 'a'"));
        assert!(text.contains("strings:"));
        assert!(text.contains("numbers:"));
    }

    #[test]
    fn test_listing_prints_immediates_bare() {
        let text = listing("a = 7");

        assert!(text.contains("PushInt 7\n"));
        assert!(!text.contains("PushInt 7 ;"));
    }

    #[test]
    fn test_listing_shows_includes() {
        let text = listing("include utils as u");

        assert!(text.contains("includes:"));
        assert!(text.contains("utils as u"));
    }

    #[test]
    fn test_listing_addresses_advance_past_operands() {
        let text = listing("a = 1");

        // PushInt at 0 occupies two words, so AssignGlobal sits at 2.
        assert!(text.contains("0000 PushInt 1"));
        assert!(text.contains("0002 AssignGlobal 0 ; 'a'"));
    }

    #[test]
    fn test_garbage_stream_faults() {
        let program = CompiledProgram {
            main: crate::object::UserFunction {
                code: vec![99],
                variable_count: 0,
            },
            strings: Vec::new(),
            numbers: Vec::new(),
            includes: Vec::new(),
        };

        assert!(disassemble(&program).is_err());
    }
}
