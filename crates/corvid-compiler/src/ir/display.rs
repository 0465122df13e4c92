//! Textual rendering of the IR.
//!
//! One line per instruction, one declaration per line at module level. The
//! same renderer backs `Display` and the annotated source-text output.

use std::fmt;

use super::{ConstValue, Decl, Function, Instr, Module, Signature, ValueType, VReg};

impl fmt::Display for VReg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I32 => write!(f, "i32"),
            Self::Ref(kind) => write!(f, "ref<{}>", kind.name()),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        write_types(f, &self.params)?;
        write!(f, ") -> (")?;
        write_types(f, &self.results)?;
        write!(f, ")")
    }
}

fn write_types(f: &mut fmt::Formatter<'_>, types: &[ValueType]) -> fmt::Result {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{ty}")?;
    }
    Ok(())
}

fn write_regs(f: &mut fmt::Formatter<'_>, regs: &[VReg]) -> fmt::Result {
    for (i, reg) in regs.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{reg}")?;
    }
    Ok(())
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConstI32 { dst, value } => write!(f, "{dst} = const.i32 {value}"),
            Self::ConstRef { dst, rodata } => write!(f, "{dst} = const.ref @{rodata}"),
            Self::GlobalLoadI32 { dst, global } => {
                write!(f, "{dst} = global.load.i32 @{global}")
            }
            Self::GlobalStoreI32 { global, src } => {
                write!(f, "global.store.i32 @{global}, {src}")
            }
            Self::GlobalLoadRef { dst, global } => {
                write!(f, "{dst} = global.load.ref @{global}")
            }
            Self::GlobalStoreRef { global, src } => {
                write!(f, "global.store.ref @{global}, {src}")
            }
            Self::AddI32 { dst, lhs, rhs } => write!(f, "{dst} = add.i32 {lhs}, {rhs}"),
            Self::SubI32 { dst, lhs, rhs } => write!(f, "{dst} = sub.i32 {lhs}, {rhs}"),
            Self::MulI32 { dst, lhs, rhs } => write!(f, "{dst} = mul.i32 {lhs}, {rhs}"),
            Self::Call {
                callee,
                args,
                results,
            } => {
                if !results.is_empty() {
                    write_regs(f, results)?;
                    write!(f, " = ")?;
                }
                write!(f, "call @{callee}(")?;
                write_regs(f, args)?;
                write!(f, ")")
            }
            Self::Return { values } => {
                write!(f, "return")?;
                if !values.is_empty() {
                    write!(f, " ")?;
                    write_regs(f, values)?;
                }
                Ok(())
            }
            Self::Trace { message, values } => {
                write!(f, "trace {message:?}(")?;
                write_regs(f, values)?;
                write!(f, ")")
            }
            Self::Print { message, values } => {
                write!(f, "print {message:?}(")?;
                write_regs(f, values)?;
                write!(f, ")")
            }
            Self::Break => write!(f, "break"),
            Self::CondBreak { cond } => write!(f, "cond_break {cond}"),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "func @{} : {} {{", self.name, self.signature)?;
        for instr in &self.body {
            writeln!(f, "  {instr}")?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "module @{} {{", self.name)?;
        for decl in &self.decls {
            match decl {
                Decl::Import(import) => {
                    writeln!(f, "  import @{} : {}", import.name, import.signature)?;
                }
                Decl::Func(func) => {
                    writeln!(f, "  func @{} : {} {{", func.name, func.signature)?;
                    for instr in &func.body {
                        writeln!(f, "    {instr}")?;
                    }
                    writeln!(f, "  }}")?;
                }
                Decl::Export(export) => {
                    writeln!(f, "  export @{} -> @{}", export.name, export.target)?;
                }
                Decl::GlobalWord(global) => {
                    writeln!(f, "  global.i32 @{} = {}", global.name, global.init)?;
                }
                Decl::GlobalRef(global) => {
                    writeln!(f, "  global.ref @{} : ref<{}>", global.name, global.object.name())?;
                }
                Decl::Rodata(rodata) => {
                    writeln!(f, "  rodata @{} = {}", rodata.name, describe_const(&rodata.value))?;
                }
            }
        }
        write!(f, "}}")
    }
}

fn describe_const(value: &ConstValue) -> String {
    match value {
        ConstValue::Bytes(bytes) => format!("bytes[{}]", bytes.len()),
        ConstValue::Words(words) => format!("words[{}]", words.len()),
        ConstValue::Utf8(text) => format!("{text:?}"),
    }
}
