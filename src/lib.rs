//! An embeddable scripting engine: a small dynamically-typed language
//! compiled to stack-machine bytecode and run in-process.
//!
//! The pipeline is `Tokenizer -> Parser -> Compiler -> Runtime`:
//!
//! ```
//! use gearscript::Value;
//!
//! let mut runtime = gearscript::compile("a = 1\nreturn a + 2", "demo.cgs").unwrap();
//! assert_eq!(runtime.start().unwrap(), Value::Number(3.0));
//! assert_eq!(runtime.get_global("a"), Value::Number(1.0));
//! ```
//!
//! Hosts see script state through the runtime's root object and can inject
//! globals before `start`. Compiled programs serialize to a compact byte
//! image via [`bytecode::CompiledProgram::to_bytes`].

pub mod ast;
pub mod bytecode;
pub mod error;
pub mod interp;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod runtime;
pub mod token;
pub mod value;

pub use error::ScriptError;
pub use runtime::{compile, NativeType, Runtime};
pub use value::Value;
