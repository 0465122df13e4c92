//! Register-machine IR consumed by the backend.
//!
//! A [`Module`] is an ordered list of top-level declarations; function bodies
//! are linear instruction sequences over virtual registers. Every value is
//! produced by exactly one instruction (or is a parameter) and typed through
//! the function's `vreg_types` table. The instruction set is a closed enum:
//! the ops are fixed and known at compile time of the tool, so dispatch is
//! exhaustive pattern matching.
//!
//! All types derive serde so module IR can be shipped as JSON or postcard.

mod display;

#[cfg(test)]
mod ir_tests;

use serde::{Deserialize, Serialize};

pub use corvid_bytecode::RefObjectKind;

/// A virtual register id, unique within one function.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct VReg(pub u32);

/// Operand/result type: a 32-bit scalar word or a reference-counted handle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    I32,
    Ref(RefObjectKind),
}

impl ValueType {
    /// Reference types live in the ref register bank; everything else is a
    /// scalar word.
    pub fn is_ref(self) -> bool {
        matches!(self, Self::Ref(_))
    }
}

/// Ordered argument and result types of a function.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub params: Vec<ValueType>,
    pub results: Vec<ValueType>,
}

/// A constant payload for a rodata segment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstValue {
    Bytes(Vec<u8>),
    Words(Vec<i32>),
    Utf8(String),
}

/// One instruction. Symbols (callees, globals, rodata) are referenced by
/// name; ordinals are resolved at encoding time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Instr {
    ConstI32 { dst: VReg, value: i32 },
    /// Materialize a ref handle to a rodata segment.
    ConstRef { dst: VReg, rodata: String },
    GlobalLoadI32 { dst: VReg, global: String },
    GlobalStoreI32 { global: String, src: VReg },
    GlobalLoadRef { dst: VReg, global: String },
    GlobalStoreRef { global: String, src: VReg },
    AddI32 { dst: VReg, lhs: VReg, rhs: VReg },
    SubI32 { dst: VReg, lhs: VReg, rhs: VReg },
    MulI32 { dst: VReg, lhs: VReg, rhs: VReg },
    Call { callee: String, args: Vec<VReg>, results: Vec<VReg> },
    Return { values: Vec<VReg> },
    Trace { message: String, values: Vec<VReg> },
    Print { message: String, values: Vec<VReg> },
    Break,
    CondBreak { cond: VReg },
}

impl Instr {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            Self::ConstI32 { .. } => "const.i32",
            Self::ConstRef { .. } => "const.ref",
            Self::GlobalLoadI32 { .. } => "global.load.i32",
            Self::GlobalStoreI32 { .. } => "global.store.i32",
            Self::GlobalLoadRef { .. } => "global.load.ref",
            Self::GlobalStoreRef { .. } => "global.store.ref",
            Self::AddI32 { .. } => "add.i32",
            Self::SubI32 { .. } => "sub.i32",
            Self::MulI32 { .. } => "mul.i32",
            Self::Call { .. } => "call",
            Self::Return { .. } => "return",
            Self::Trace { .. } => "trace",
            Self::Print { .. } => "print",
            Self::Break => "break",
            Self::CondBreak { .. } => "cond_break",
        }
    }

    /// Virtual registers defined by this instruction.
    pub fn defs(&self) -> Vec<VReg> {
        match self {
            Self::ConstI32 { dst, .. }
            | Self::ConstRef { dst, .. }
            | Self::GlobalLoadI32 { dst, .. }
            | Self::GlobalLoadRef { dst, .. }
            | Self::AddI32 { dst, .. }
            | Self::SubI32 { dst, .. }
            | Self::MulI32 { dst, .. } => vec![*dst],
            Self::Call { results, .. } => results.clone(),
            _ => Vec::new(),
        }
    }

    /// Virtual registers read by this instruction.
    pub fn uses(&self) -> Vec<VReg> {
        match self {
            Self::GlobalStoreI32 { src, .. } | Self::GlobalStoreRef { src, .. } => vec![*src],
            Self::AddI32 { lhs, rhs, .. }
            | Self::SubI32 { lhs, rhs, .. }
            | Self::MulI32 { lhs, rhs, .. } => vec![*lhs, *rhs],
            Self::Call { args, .. } => args.clone(),
            Self::Return { values } | Self::Trace { values, .. } | Self::Print { values, .. } => {
                values.clone()
            }
            Self::CondBreak { cond } => vec![*cond],
            _ => Vec::new(),
        }
    }

    /// Debug-only instructions, illegal when debug-op stripping is requested.
    pub fn is_debug(&self) -> bool {
        matches!(
            self,
            Self::Trace { .. } | Self::Print { .. } | Self::Break | Self::CondBreak { .. }
        )
    }

    /// Instructions that must survive dead-code elimination even when their
    /// results are unused.
    pub fn has_side_effect(&self) -> bool {
        matches!(
            self,
            Self::GlobalStoreI32 { .. }
                | Self::GlobalStoreRef { .. }
                | Self::Call { .. }
                | Self::Return { .. }
                | Self::Trace { .. }
                | Self::Print { .. }
                | Self::Break
                | Self::CondBreak { .. }
        )
    }

    /// Apply `f` to every register operand this instruction reads.
    pub fn for_each_use_mut(&mut self, mut f: impl FnMut(&mut VReg)) {
        match self {
            Self::GlobalStoreI32 { src, .. } | Self::GlobalStoreRef { src, .. } => f(src),
            Self::AddI32 { lhs, rhs, .. }
            | Self::SubI32 { lhs, rhs, .. }
            | Self::MulI32 { lhs, rhs, .. } => {
                f(lhs);
                f(rhs);
            }
            Self::Call { args, .. } => args.iter_mut().for_each(f),
            Self::Return { values } | Self::Trace { values, .. } | Self::Print { values, .. } => {
                values.iter_mut().for_each(f)
            }
            Self::CondBreak { cond } => f(cond),
            _ => {}
        }
    }

    /// Apply `f` to every register operand, defs included.
    pub fn for_each_reg_mut(&mut self, mut f: impl FnMut(&mut VReg)) {
        match self {
            Self::ConstI32 { dst, .. }
            | Self::ConstRef { dst, .. }
            | Self::GlobalLoadI32 { dst, .. }
            | Self::GlobalLoadRef { dst, .. } => f(dst),
            Self::AddI32 { dst, lhs, rhs }
            | Self::SubI32 { dst, lhs, rhs }
            | Self::MulI32 { dst, lhs, rhs } => {
                f(dst);
                f(lhs);
                f(rhs);
            }
            Self::Call { args, results, .. } => {
                args.iter_mut().for_each(&mut f);
                results.iter_mut().for_each(f);
            }
            _ => self.for_each_use_mut(f),
        }
    }
}

/// An imported function: signature only, body lives in the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFunction {
    pub name: String,
    pub signature: Signature,
    #[serde(default)]
    pub ordinal: Option<u32>,
}

/// An internal function with a body.
///
/// `vreg_types` is indexed by virtual register id; the first `params.len()`
/// entries mirror the parameter types, and parameters are considered defined
/// at function entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub signature: Signature,
    pub vreg_types: Vec<ValueType>,
    pub body: Vec<Instr>,
    #[serde(default)]
    pub ordinal: Option<u32>,
}

impl Function {
    /// Allocate a fresh virtual register of the given type.
    pub fn new_vreg(&mut self, ty: ValueType) -> VReg {
        let id = self.vreg_types.len() as u32;
        self.vreg_types.push(ty);
        VReg(id)
    }
}

/// An export alias publishing an internal function under a public name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Export {
    pub name: String,
    /// Name of the internal function this export aliases.
    pub target: String,
    #[serde(default)]
    pub ordinal: Option<u32>,
}

/// A global scalar word slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalWord {
    pub name: String,
    #[serde(default)]
    pub init: i32,
    #[serde(default)]
    pub ordinal: Option<u32>,
}

/// A global reference slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalRef {
    pub name: String,
    pub object: RefObjectKind,
    #[serde(default)]
    pub ordinal: Option<u32>,
}

/// An immutable named constant blob.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RodataSegment {
    pub name: String,
    pub value: ConstValue,
    #[serde(default)]
    pub ordinal: Option<u32>,
}

/// A top-level declaration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decl {
    Import(ImportFunction),
    Func(Function),
    Export(Export),
    GlobalWord(GlobalWord),
    GlobalRef(GlobalRef),
    Rodata(RodataSegment),
}

impl Decl {
    pub fn name(&self) -> &str {
        match self {
            Self::Import(d) => &d.name,
            Self::Func(d) => &d.name,
            Self::Export(d) => &d.name,
            Self::GlobalWord(d) => &d.name,
            Self::GlobalRef(d) => &d.name,
            Self::Rodata(d) => &d.name,
        }
    }
}

/// A whole IR module: named, ordered declarations.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub decls: Vec<Decl>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decls: Vec::new(),
        }
    }

    /// Internal functions in declaration order.
    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Func(f) => Some(f),
            _ => None,
        })
    }

    pub fn functions_mut(&mut self) -> impl Iterator<Item = &mut Function> {
        self.decls.iter_mut().filter_map(|d| match d {
            Decl::Func(f) => Some(f),
            _ => None,
        })
    }

    /// Imported functions in declaration order.
    pub fn imports(&self) -> impl Iterator<Item = &ImportFunction> {
        self.decls.iter().filter_map(|d| match d {
            Decl::Import(i) => Some(i),
            _ => None,
        })
    }

    pub fn find_function(&self, name: &str) -> Option<&Function> {
        self.functions().find(|f| f.name == name)
    }
}
