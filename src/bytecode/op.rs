use crate::error::ScriptError;

// =============================================================================
// OPCODE - the bytecode instruction set
// =============================================================================

/// One bytecode instruction.
///
/// Instructions live in a flat `Vec<i32>` stream: the opcode discriminant,
/// followed by zero or one inline operand words. Discriminants are stable so
/// serialized programs stay readable across builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum OpCode {
    /// Stop the current frame, leaving the produced value on top of stack.
    Return = 1,
    /// Stop the current frame with a null result.
    ReturnNull = 2,

    // constants
    PushNull = 3,
    /// Operand: an integral immediate (no pool lookup).
    PushInt = 4,
    /// Operand: index into the number pool.
    PushNumber = 5,
    /// Operand: index into the string dictionary.
    PushString = 6,

    // variable / property access
    /// Operand: local slot index. Pushes a copy of the slot's value.
    PushVar = 7,
    /// Pushes the runtime's root object.
    PushRoot = 8,
    /// Operand: dictionary index of the member name. Pops the receiver and
    /// pushes the named property's value.
    PushMemberValue = 9,
    /// Operand: dictionary index. Pushes the interned name string itself.
    PushMemberName = 10,
    /// Operand: local slot index. Pops into the slot.
    AssignVar = 11,
    /// Operand: dictionary index. Pops a value into the named root property.
    AssignGlobal = 12,
    /// Operand: dictionary index. Pops a value into the named property of the
    /// root object's `modules` entry.
    AssignModule = 13,

    // arithmetic: pop right, pop left, dispatch on the left operand
    Add = 14,
    Sub = 15,
    Mul = 16,
    Div = 17,
    Mod = 18,

    // object construction
    PushNewObject = 19,
}

impl OpCode {
    /// Number of inline operand words following the opcode.
    pub fn operand_count(&self) -> usize {
        match self {
            OpCode::PushInt
            | OpCode::PushNumber
            | OpCode::PushString
            | OpCode::PushVar
            | OpCode::PushMemberValue
            | OpCode::PushMemberName
            | OpCode::AssignVar
            | OpCode::AssignGlobal
            | OpCode::AssignModule => 1,
            _ => 0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            OpCode::Return => "Return",
            OpCode::ReturnNull => "ReturnNull",
            OpCode::PushNull => "PushNull",
            OpCode::PushInt => "PushInt",
            OpCode::PushNumber => "PushNumber",
            OpCode::PushString => "PushString",
            OpCode::PushVar => "PushVar",
            OpCode::PushRoot => "PushRoot",
            OpCode::PushMemberValue => "PushMemberValue",
            OpCode::PushMemberName => "PushMemberName",
            OpCode::AssignVar => "AssignVar",
            OpCode::AssignGlobal => "AssignGlobal",
            OpCode::AssignModule => "AssignModule",
            OpCode::Add => "Add",
            OpCode::Sub => "Sub",
            OpCode::Mul => "Mul",
            OpCode::Div => "Div",
            OpCode::Mod => "Mod",
            OpCode::PushNewObject => "PushNewObject",
        }
    }
}

impl TryFrom<i32> for OpCode {
    type Error = ScriptError;

    fn try_from(word: i32) -> Result<OpCode, ScriptError> {
        let op = match word {
            1 => OpCode::Return,
            2 => OpCode::ReturnNull,
            3 => OpCode::PushNull,
            4 => OpCode::PushInt,
            5 => OpCode::PushNumber,
            6 => OpCode::PushString,
            7 => OpCode::PushVar,
            8 => OpCode::PushRoot,
            9 => OpCode::PushMemberValue,
            10 => OpCode::PushMemberName,
            11 => OpCode::AssignVar,
            12 => OpCode::AssignGlobal,
            13 => OpCode::AssignModule,
            14 => OpCode::Add,
            15 => OpCode::Sub,
            16 => OpCode::Mul,
            17 => OpCode::Div,
            18 => OpCode::Mod,
            19 => OpCode::PushNewObject,
            other => return Err(ScriptError::vm(format!("unexpected opcode {}", other))),
        };
        Ok(op)
    }
}

impl std::fmt::Display for OpCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
