//! Bytecode and constant encoding.
//!
//! Encoding is purely per-symbol: each function body is encoded on its own
//! against a symbol index and its register allocation, and each rodata
//! payload is serialized independently, so the builder can concatenate the
//! results in ordinal order afterwards.

mod bytecode;
mod constant;


pub use bytecode::{
    EncodedFunction, IMPORT_ORDINAL_BIT, Opcode, REF_REGISTER_BIT, encode_function,
};
pub use constant::serialize_constant;

use std::collections::HashMap;

use crate::ir::{Decl, Module};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EncodeError {
    #[error("unknown symbol '{0}'")]
    UnknownSymbol(String),
    #[error("instruction takes {0} operands, limit is 255")]
    TooManyOperands(usize),
    #[error("register slot {0} exceeds the encodable range")]
    RegisterOverflow(usize),
    #[error("virtual register %{0} has no allocated slot")]
    UnallocatedRegister(u32),
    #[error("constant payload is {0} bytes, limit is 4 GiB")]
    ConstantTooLarge(usize),
    #[error("debug message is {0} bytes, limit is 65535")]
    MessageTooLong(usize),
}

/// How a call target is addressed in bytecode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CalleeKind {
    Import(u32),
    Internal(u32),
}

/// Name-to-ordinal lookup for everything bytecode can reference.
///
/// Built once per module after canonicalization; ordinals are final by then.
pub struct SymbolIndex {
    callees: HashMap<String, CalleeKind>,
    global_words: HashMap<String, u32>,
    global_refs: HashMap<String, u32>,
    rodata: HashMap<String, u32>,
}

impl SymbolIndex {
    /// Build the index from a canonicalized module.
    pub fn build(module: &Module) -> Self {
        let mut callees = HashMap::new();
        let mut global_words = HashMap::new();
        let mut global_refs = HashMap::new();
        let mut rodata = HashMap::new();

        for decl in &module.decls {
            match decl {
                Decl::Import(d) => {
                    let ordinal = d.ordinal.expect("ordinals are assigned before encoding");
                    callees.insert(d.name.clone(), CalleeKind::Import(ordinal));
                }
                Decl::Func(d) => {
                    let ordinal = d.ordinal.expect("ordinals are assigned before encoding");
                    callees.insert(d.name.clone(), CalleeKind::Internal(ordinal));
                }
                Decl::GlobalWord(d) => {
                    let ordinal = d.ordinal.expect("ordinals are assigned before encoding");
                    global_words.insert(d.name.clone(), ordinal);
                }
                Decl::GlobalRef(d) => {
                    let ordinal = d.ordinal.expect("ordinals are assigned before encoding");
                    global_refs.insert(d.name.clone(), ordinal);
                }
                Decl::Rodata(d) => {
                    let ordinal = d.ordinal.expect("ordinals are assigned before encoding");
                    rodata.insert(d.name.clone(), ordinal);
                }
                Decl::Export(_) => {}
            }
        }

        Self {
            callees,
            global_words,
            global_refs,
            rodata,
        }
    }

    pub fn callee(&self, name: &str) -> Result<CalleeKind, EncodeError> {
        self.callees
            .get(name)
            .copied()
            .ok_or_else(|| EncodeError::UnknownSymbol(name.to_string()))
    }

    pub fn global_word(&self, name: &str) -> Result<u32, EncodeError> {
        self.global_words
            .get(name)
            .copied()
            .ok_or_else(|| EncodeError::UnknownSymbol(name.to_string()))
    }

    pub fn global_ref(&self, name: &str) -> Result<u32, EncodeError> {
        self.global_refs
            .get(name)
            .copied()
            .ok_or_else(|| EncodeError::UnknownSymbol(name.to_string()))
    }

    pub fn rodata(&self, name: &str) -> Result<u32, EncodeError> {
        self.rodata
            .get(name)
            .copied()
            .ok_or_else(|| EncodeError::UnknownSymbol(name.to_string()))
    }
}
