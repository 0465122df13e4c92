//! Canonicalization: the module's last stop before encoding.
//!
//! Fixed step order: legality checking (including the debug-op policy),
//! the optional optimization fixpoint, then final ordinal assignment. Nothing
//! may mutate the module after ordinals are assigned; every later stage reads
//! them as array indices.

mod inline;
mod simplify;


use std::collections::HashSet;

use crate::error::{TranslateError, TranslateResult};
use crate::ir::{Decl, Instr, Module};
use crate::translate::TargetOptions;

/// Bound on optimization rounds. The passes normally reach fixpoint in two
/// or three rounds; the cap guarantees termination regardless.
pub const MAX_OPT_ITERATIONS: usize = 8;

/// Canonicalize the module in place. Must run exactly once per translation.
pub fn canonicalize(module: &mut Module, options: &TargetOptions) -> TranslateResult<()> {
    check_legal(module, options)?;
    if options.optimize {
        run_fixpoint(module)?;
    }
    assign_ordinals(module);
    Ok(())
}

/// Verify that only serializable instructions remain and that every symbol
/// reference resolves.
///
/// Debug ops are never rewritten away here; when stripping is requested they
/// are simply illegal and must already be gone.
fn check_legal(module: &Module, options: &TargetOptions) -> TranslateResult<()> {
    let mut callees = HashSet::new();
    let mut internal = HashSet::new();
    let mut global_words = HashSet::new();
    let mut global_refs = HashSet::new();
    let mut rodata = HashSet::new();
    for decl in &module.decls {
        match decl {
            Decl::Import(d) => {
                callees.insert(d.name.as_str());
            }
            Decl::Func(d) => {
                callees.insert(d.name.as_str());
                internal.insert(d.name.as_str());
            }
            Decl::GlobalWord(d) => {
                global_words.insert(d.name.as_str());
            }
            Decl::GlobalRef(d) => {
                global_refs.insert(d.name.as_str());
            }
            Decl::Rodata(d) => {
                rodata.insert(d.name.as_str());
            }
            Decl::Export(_) => {}
        }
    }

    for decl in &module.decls {
        match decl {
            Decl::Export(export) => {
                if !internal.contains(export.target.as_str()) {
                    return Err(TranslateError::TransformFailure {
                        symbol: export.name.clone(),
                        reason: format!(
                            "export targets unknown internal function '{}'",
                            export.target
                        ),
                    });
                }
            }
            Decl::Func(func) => {
                for instr in &func.body {
                    if options.strip_debug_ops && instr.is_debug() {
                        return Err(TranslateError::IllegalConstruct {
                            function: func.name.clone(),
                            mnemonic: instr.mnemonic(),
                        });
                    }
                    check_refs(instr, &func.name, &callees, &global_words, &global_refs, &rodata)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn check_refs(
    instr: &Instr,
    function: &str,
    callees: &HashSet<&str>,
    global_words: &HashSet<&str>,
    global_refs: &HashSet<&str>,
    rodata: &HashSet<&str>,
) -> TranslateResult<()> {
    let missing = |kind: &str, name: &str| TranslateError::TransformFailure {
        symbol: function.to_string(),
        reason: format!("references unknown {kind} '{name}'"),
    };
    match instr {
        Instr::ConstRef { rodata: name, .. } if !rodata.contains(name.as_str()) => {
            Err(missing("rodata segment", name))
        }
        Instr::GlobalLoadI32 { global, .. } | Instr::GlobalStoreI32 { global, .. }
            if !global_words.contains(global.as_str()) =>
        {
            Err(missing("global word", global))
        }
        Instr::GlobalLoadRef { global, .. } | Instr::GlobalStoreRef { global, .. }
            if !global_refs.contains(global.as_str()) =>
        {
            Err(missing("global ref", global))
        }
        Instr::Call { callee, .. } if !callees.contains(callee.as_str()) => {
            Err(missing("function", callee))
        }
        _ => Ok(()),
    }
}

/// Apply the local optimizations until nothing changes, bounded by
/// [`MAX_OPT_ITERATIONS`].
fn run_fixpoint(module: &mut Module) -> TranslateResult<()> {
    for _ in 0..MAX_OPT_ITERATIONS {
        let mut changed = inline::inline_small_functions(module)?;
        for func in module.functions_mut() {
            changed |= simplify::fold_constants(func);
            changed |= simplify::eliminate_common_subexpressions(func);
            changed |= simplify::remove_dead_code(func);
        }
        if !changed {
            return Ok(());
        }
    }
    Ok(())
}

/// Assign final contiguous ordinals per category, in declaration order.
fn assign_ordinals(module: &mut Module) {
    let mut imports = 0u32;
    let mut funcs = 0u32;
    let mut exports = 0u32;
    let mut global_words = 0u32;
    let mut global_refs = 0u32;
    let mut rodata = 0u32;

    let mut next = |counter: &mut u32| {
        let ordinal = *counter;
        *counter += 1;
        Some(ordinal)
    };

    for decl in &mut module.decls {
        match decl {
            Decl::Import(d) => d.ordinal = next(&mut imports),
            Decl::Func(d) => d.ordinal = next(&mut funcs),
            Decl::Export(d) => d.ordinal = next(&mut exports),
            Decl::GlobalWord(d) => d.ordinal = next(&mut global_words),
            Decl::GlobalRef(d) => d.ordinal = next(&mut global_refs),
            Decl::Rodata(d) => d.ordinal = next(&mut rodata),
        }
    }
}
