use std::rc::Rc;

use crate::bytecode::OpCode;
use crate::error::ScriptError;
use crate::object::{Object, StringObject, UserFunction, UserObject};
use crate::value::Value;

// =============================================================================
// INTERPRETER - stack-based bytecode execution
// =============================================================================

/// Interpreter limits.
#[derive(Debug, Clone, Copy)]
pub struct VmConfig {
    /// Capacity of the value stack, in slots. The stack never grows; pushing
    /// past this is a runtime fault.
    pub max_stack_size: usize,
}

impl Default for VmConfig {
    fn default() -> VmConfig {
        VmConfig {
            max_stack_size: 10_000,
        }
    }
}

/// Read-only surroundings of one execution: the constant pools and the root
/// object. Borrowed from the owning runtime for the duration of a call.
pub struct ExecContext<'a> {
    pub strings: &'a [Rc<StringObject>],
    pub numbers: &'a [f64],
    pub root: &'a Rc<UserObject>,
}

impl ExecContext<'_> {
    fn string(&self, index: i32) -> Result<Rc<StringObject>, ScriptError> {
        self.strings
            .get(index as usize)
            .cloned()
            .ok_or_else(|| ScriptError::vm(format!("string index {} out of range", index)))
    }

    fn number(&self, index: i32) -> Result<f64, ScriptError> {
        self.numbers
            .get(index as usize)
            .copied()
            .ok_or_else(|| ScriptError::vm(format!("number index {} out of range", index)))
    }
}

/// The value stack and the fetch-decode-execute loop.
///
/// The stack is preallocated to its full capacity and filled with nulls;
/// `stack_index` marks the live top. Each `execute` call reserves the callee's
/// local slots above the caller's top, runs the code, and always leaves
/// exactly one value in place of the frame: the returned value, or null.
pub struct Interpreter {
    stack: Vec<Value>,
    stack_index: usize,
}

impl Interpreter {
    pub fn new(config: VmConfig) -> Interpreter {
        Interpreter {
            stack: vec![Value::null(); config.max_stack_size],
            stack_index: 0,
        }
    }

    pub fn push(&mut self, value: Value) -> Result<(), ScriptError> {
        if self.stack_index == self.stack.len() {
            return Err(ScriptError::vm("stack overflow"));
        }

        self.stack[self.stack_index] = value;
        self.stack_index += 1;
        Ok(())
    }

    pub fn pop(&mut self) -> Result<Value, ScriptError> {
        if self.stack_index == 0 {
            return Err(ScriptError::vm("stack underflow"));
        }

        self.stack_index -= 1;
        // Replace with null so popped slots do not pin objects alive.
        Ok(std::mem::replace(
            &mut self.stack[self.stack_index],
            Value::null(),
        ))
    }

    /// Number of live values on the stack.
    pub fn stack_len(&self) -> usize {
        self.stack_index
    }

    /// Runs `function` in a fresh frame on top of the current stack.
    ///
    /// Frame protocol: the frame base is the caller's stack top. The callee's
    /// locals are reserved above it, null-initialized. On Return the produced
    /// value (if any was pushed above the locals) is captured, the stack is
    /// retracted to the base, and that value - or null - is pushed, so every
    /// call nets exactly one value.
    pub fn execute(
        &mut self,
        function: &UserFunction,
        context: &ExecContext<'_>,
    ) -> Result<(), ScriptError> {
        let base = self.stack_index;
        let frame_top = base + function.variable_count;

        if frame_top > self.stack.len() {
            return Err(ScriptError::vm("stack overflow"));
        }
        for slot in &mut self.stack[base..frame_top] {
            *slot = Value::null();
        }
        self.stack_index = frame_top;

        let code = &function.code;
        let mut ip = 0;

        loop {
            let word = *code
                .get(ip)
                .ok_or_else(|| ScriptError::vm("instruction stream ran past the end"))?;
            let op = OpCode::try_from(word)?;
            ip += 1;

            let operand = if op.operand_count() == 1 {
                let operand = *code
                    .get(ip)
                    .ok_or_else(|| ScriptError::vm("truncated instruction stream"))?;
                ip += 1;
                operand
            } else {
                0
            };

            match op {
                OpCode::Return => {
                    let result = if self.stack_index > frame_top {
                        self.pop()?
                    } else {
                        Value::null()
                    };
                    self.retract_to(base);
                    return self.push(result);
                }
                OpCode::ReturnNull => {
                    self.retract_to(base);
                    return self.push(Value::null());
                }

                OpCode::PushNull => self.push(Value::null())?,
                OpCode::PushInt => self.push(Value::Number(operand as f64))?,
                OpCode::PushNumber => self.push(Value::Number(context.number(operand)?))?,
                OpCode::PushString => self.push(Value::Object(context.string(operand)?))?,

                OpCode::PushVar => {
                    let slot = self.local_slot(base, frame_top, operand)?;
                    self.push(self.stack[slot].clone())?;
                }
                OpCode::PushRoot => self.push(Value::Object(Rc::clone(context.root) as Rc<dyn Object>))?,
                OpCode::PushMemberValue => {
                    let name = context.string(operand)?;
                    let receiver = self.pop()?;
                    match receiver {
                        Value::Object(object) => self.push(object.get_by_name(name.text()))?,
                        Value::Number(_) => {
                            return Err(ScriptError::vm(format!(
                                "cannot read '{}' from a number",
                                name.text()
                            )));
                        }
                    }
                }
                OpCode::PushMemberName => self.push(Value::Object(context.string(operand)?))?,

                OpCode::AssignVar => {
                    let slot = self.local_slot(base, frame_top, operand)?;
                    let value = self.pop()?;
                    self.stack[slot] = value;
                }
                OpCode::AssignGlobal => {
                    let name = context.string(operand)?;
                    let value = self.pop()?;
                    context.root.set_by_name(name.text(), value)?;
                }
                OpCode::AssignModule => {
                    let name = context.string(operand)?;
                    let value = self.pop()?;
                    match context.root.get_by_name("modules") {
                        Value::Object(modules) => modules.set_by_name(name.text(), value)?,
                        Value::Number(_) => {
                            return Err(ScriptError::vm("'modules' is not an object"));
                        }
                    }
                }

                OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div | OpCode::Mod => {
                    let right = self.pop()?;
                    let left = self.pop()?;
                    let result = match op {
                        OpCode::Add => left.add(&right)?,
                        OpCode::Sub => left.sub(&right)?,
                        OpCode::Mul => left.mul(&right)?,
                        OpCode::Div => left.div(&right)?,
                        _ => left.rem(&right)?,
                    };
                    self.push(result)?;
                }

                OpCode::PushNewObject => self.push(Value::Object(UserObject::new()))?,
            }
        }
    }

    fn local_slot(&self, base: usize, frame_top: usize, operand: i32) -> Result<usize, ScriptError> {
        if operand < 0 {
            return Err(ScriptError::vm(format!(
                "local slot {} out of range",
                operand
            )));
        }

        let slot = base + operand as usize;
        if slot >= frame_top {
            return Err(ScriptError::vm(format!(
                "local slot {} out of range",
                operand
            )));
        }
        Ok(slot)
    }

    fn retract_to(&mut self, base: usize) {
        // Null out the abandoned frame so it does not pin objects alive.
        for slot in &mut self.stack[base..self.stack_index] {
            *slot = Value::null();
        }
        self.stack_index = base;
    }
}
