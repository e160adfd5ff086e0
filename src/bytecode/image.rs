use serde::{Deserialize, Serialize};

use crate::object::UserFunction;

/// A recorded `include <name> [as <alias>]` statement.
///
/// The compiler records includes but emits no code for them; resolving the
/// named script against a filesystem or asset store is a host concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncludeRef {
    pub name: String,
    /// Empty when the include had no `as` clause.
    pub alias: String,
}

/// The finished output of one compilation unit: the top-level function plus
/// the constant pools it indexes into.
///
/// Pool indices are stable only within one compiled program; two separately
/// compiled programs never share indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledProgram {
    pub main: UserFunction,
    /// Interned string literals and property names, deduplicated by value.
    pub strings: Vec<String>,
    /// Interned non-integral number literals, deduplicated by value.
    pub numbers: Vec<f64>,
    pub includes: Vec<IncludeRef>,
}

impl CompiledProgram {
    /// Serializes the program to a compact byte image.
    pub fn to_bytes(&self) -> Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    /// Deserializes a byte image produced by `to_bytes`.
    pub fn from_bytes(bytes: &[u8]) -> Result<CompiledProgram, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}
