//! Liveness and register-allocation annotations for the source-text output.
//!
//! Used only when the requested output format is the textual IR: allocation
//! runs purely to decorate the printout, and no container is built.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use crate::ir::{Decl, Instr, Module, VReg};
use crate::regalloc::{Allocation, Bank, LiveInterval};

/// Per-function analysis results keyed by function name.
pub struct FunctionAnnotations {
    pub intervals: Vec<LiveInterval>,
    pub allocation: Allocation,
}

/// Print the module with each function decorated by its register assignment
/// and live ranges.
pub fn print_annotated(
    module: &Module,
    annotations: &BTreeMap<String, FunctionAnnotations>,
) -> String {
    let mut out = String::new();
    writeln!(out, "module @{} {{", module.name).unwrap();
    for decl in &module.decls {
        match decl {
            Decl::Func(func) => {
                let annotation = annotations.get(&func.name);
                match annotation {
                    Some(a) => writeln!(
                        out,
                        "  func @{} : {} {{  ; wregs={} rregs={}",
                        func.name, func.signature, a.allocation.word_count, a.allocation.ref_count,
                    )
                    .unwrap(),
                    None => writeln!(out, "  func @{} : {} {{", func.name, func.signature).unwrap(),
                }
                for instr in &func.body {
                    let line = instr.to_string();
                    match annotation.and_then(|a| describe_defs(instr, a)) {
                        Some(comment) => {
                            writeln!(out, "    {line:<40}; {comment}").unwrap()
                        }
                        None => writeln!(out, "    {line}").unwrap(),
                    }
                }
                writeln!(out, "  }}").unwrap();
            }
            Decl::Import(import) => {
                writeln!(out, "  import @{} : {}", import.name, import.signature).unwrap();
            }
            Decl::Export(export) => {
                writeln!(out, "  export @{} -> @{}", export.name, export.target).unwrap();
            }
            Decl::GlobalWord(global) => {
                writeln!(out, "  global.i32 @{} = {}", global.name, global.init).unwrap();
            }
            Decl::GlobalRef(global) => {
                writeln!(out, "  global.ref @{} : ref<{}>", global.name, global.object.name())
                    .unwrap();
            }
            Decl::Rodata(rodata) => {
                writeln!(out, "  rodata @{}", rodata.name).unwrap();
            }
        }
    }
    writeln!(out, "}}").unwrap();
    out
}

/// Describe the slots and live ranges of the registers this instruction
/// defines, e.g. `%2 -> w1 [2,3]`.
fn describe_defs(instr: &Instr, annotation: &FunctionAnnotations) -> Option<String> {
    let defs = instr.defs();
    if defs.is_empty() {
        return None;
    }
    let parts: Vec<String> = defs
        .iter()
        .map(|&def| describe_reg(def, annotation))
        .collect();
    Some(parts.join(", "))
}

fn describe_reg(vreg: VReg, annotation: &FunctionAnnotations) -> String {
    let slot = match annotation.allocation.slot(vreg) {
        Some((Bank::Word, slot)) => format!("w{slot}"),
        Some((Bank::Ref, slot)) => format!("r{slot}"),
        None => "unallocated".to_string(),
    };
    let range = annotation
        .intervals
        .iter()
        .find(|interval| interval.vreg == vreg)
        .map(|interval| format!(" [{},{}]", interval.start, interval.end))
        .unwrap_or_default();
    format!("{vreg} -> {slot}{range}")
}
