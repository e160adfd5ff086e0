use std::rc::Rc;

use crate::bytecode::{CompiledProgram, Compiler};
use crate::error::ScriptError;
use crate::interp::{ExecContext, Interpreter, VmConfig};
use crate::lexer::Tokenizer;
use crate::object::{NativeFunction, StringObject, UserFunction, UserObject};
use crate::parser::Parser;
use crate::value::Value;

// =============================================================================
// RUNTIME - one compiled program plus the state to run it
// =============================================================================

/// Compiles source text into a ready-to-run [`Runtime`].
///
/// `filename` labels diagnostics only; no file is read here.
pub fn compile(source: &str, filename: &str) -> Result<Runtime, ScriptError> {
    let mut tokenizer = Tokenizer::new(source, filename)?;
    let program = Parser::new(&mut tokenizer).parse_program()?;
    let compiled = Compiler::new().compile_program(&program)?;
    Ok(Runtime::new(compiled))
}

/// A host-registered object type: a name plus its method table. Registered
/// types are an extension point for hosts; scripts reach them through
/// host-installed globals.
pub struct NativeType {
    pub name: String,
    pub methods: Vec<Rc<NativeFunction>>,
}

impl NativeType {
    pub fn new(name: impl Into<String>) -> NativeType {
        NativeType {
            name: name.into(),
            methods: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: NativeFunction) -> NativeType {
        self.methods.push(Rc::new(method));
        self
    }

    pub fn method(&self, name: &str) -> Option<Rc<NativeFunction>> {
        self.methods.iter().find(|m| m.name() == name).cloned()
    }
}

/// Owns everything one program needs to run: the compiled image, the interned
/// string dictionary (as shared string objects), the root object, one
/// interpreter, and the host's registered types.
///
/// A runtime is single-threaded; its objects are shared by `Rc` and never
/// cross threads. Run several scripts in parallel by giving each its own
/// runtime on its own thread.
pub struct Runtime {
    program: CompiledProgram,
    main: Rc<UserFunction>,
    dictionary: Vec<Rc<StringObject>>,
    root: Rc<UserObject>,
    interpreter: Interpreter,
    types: Vec<NativeType>,
}

impl Runtime {
    pub fn new(program: CompiledProgram) -> Runtime {
        Runtime::with_config(program, VmConfig::default())
    }

    pub fn with_config(program: CompiledProgram, config: VmConfig) -> Runtime {
        let dictionary = program
            .strings
            .iter()
            .map(StringObject::new)
            .collect();
        let main = Rc::new(program.main.clone());

        let root = UserObject::new();
        // The module table scripts assign into; empty until a host wires
        // include resolution.
        root.set("modules", Value::Object(UserObject::new()));

        Runtime {
            program,
            main,
            dictionary,
            root,
            interpreter: Interpreter::new(config),
            types: Vec::new(),
        }
    }

    /// Runs the program's top-level code and returns its result value.
    ///
    /// Repeated calls re-run main against the same root object, so state set
    /// by an earlier run is visible to later ones.
    pub fn start(&mut self) -> Result<Value, ScriptError> {
        let main = Rc::clone(&self.main);
        let context = ExecContext {
            strings: &self.dictionary,
            numbers: &self.program.numbers,
            root: &self.root,
        };

        self.interpreter.execute(&main, &context)?;
        self.interpreter.pop()
    }

    pub fn root(&self) -> &Rc<UserObject> {
        &self.root
    }

    pub fn get_global(&self, name: &str) -> Value {
        self.root.get(name)
    }

    pub fn set_global(&self, name: &str, value: Value) {
        self.root.set(name, value);
    }

    /// The compiled image, e.g. for serialization with
    /// [`CompiledProgram::to_bytes`].
    pub fn program(&self) -> &CompiledProgram {
        &self.program
    }

    /// Dictionary index of `text`, interning it if the compiler never saw it.
    /// The backing program's string pool is kept in step so the image stays
    /// serializable.
    pub fn dictionary_index(&mut self, text: &str) -> usize {
        if let Some(index) = self.program.strings.iter().position(|s| s == text) {
            return index;
        }

        self.program.strings.push(text.to_string());
        self.dictionary.push(StringObject::new(text));
        self.dictionary.len() - 1
    }

    /// The shared string object for `text`, interning on first sight.
    pub fn dictionary_entry(&mut self, text: &str) -> Rc<StringObject> {
        let index = self.dictionary_index(text);
        Rc::clone(&self.dictionary[index])
    }

    // -------------------------------------------------------------------------
    // Native type registry
    // -------------------------------------------------------------------------

    pub fn register_type(&mut self, native: NativeType) -> usize {
        self.types.push(native);
        self.types.len() - 1
    }

    pub fn lookup_type(&self, name: &str) -> Option<&NativeType> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn type_index(&self, name: &str) -> Option<usize> {
        self.types.iter().position(|t| t.name == name)
    }
}
