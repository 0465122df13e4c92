//! Inlining of small leaf functions.
//!
//! A candidate body is spliced into the caller with its registers remapped:
//! parameters become the call's argument registers, everything else gets a
//! fresh register in the caller, and the callee's returned values replace the
//! call's result registers downstream. The callee itself stays in the module;
//! dead-code elimination cannot remove functions, only instructions.

use std::collections::HashMap;

use crate::error::{TranslateError, TranslateResult};
use crate::ir::{Function, Instr, Module, ValueType, VReg};

/// Bodies at most this long are inline candidates.
const INLINE_MAX_INSTRS: usize = 8;

struct Candidate {
    param_count: usize,
    result_count: usize,
    vreg_types: Vec<ValueType>,
    body: Vec<Instr>,
}

/// Inline every call to a small leaf function. Returns whether anything
/// changed.
pub fn inline_small_functions(module: &mut Module) -> TranslateResult<bool> {
    let candidates = collect_candidates(module);
    if candidates.is_empty() {
        return Ok(false);
    }

    let mut changed = false;
    for func in module.functions_mut() {
        changed |= inline_into(func, &candidates)?;
    }
    Ok(changed)
}

/// A candidate is a short leaf: no calls, a single trailing return, and a
/// consistent register table.
fn collect_candidates(module: &Module) -> HashMap<String, Candidate> {
    module
        .functions()
        .filter(|func| {
            func.body.len() <= INLINE_MAX_INSTRS
                && matches!(func.body.last(), Some(Instr::Return { .. }))
                && func.body[..func.body.len() - 1]
                    .iter()
                    .all(|instr| !matches!(instr, Instr::Call { .. } | Instr::Return { .. }))
                && registers_in_range(func)
        })
        .map(|func| {
            (
                func.name.clone(),
                Candidate {
                    param_count: func.signature.params.len(),
                    result_count: func.signature.results.len(),
                    vreg_types: func.vreg_types.clone(),
                    body: func.body.clone(),
                },
            )
        })
        .collect()
}

fn registers_in_range(func: &Function) -> bool {
    let limit = func.vreg_types.len() as u32;
    func.body.iter().all(|instr| {
        instr.defs().iter().chain(instr.uses().iter()).all(|reg| reg.0 < limit)
    })
}

fn inline_into(
    func: &mut Function,
    candidates: &HashMap<String, Candidate>,
) -> TranslateResult<bool> {
    let caller = func.name.clone();
    let applicable = |callee: &str| callee != caller && candidates.contains_key(callee);
    if !func.body.iter().any(|instr| {
        matches!(instr, Instr::Call { callee, .. } if applicable(callee))
    }) {
        return Ok(false);
    }

    let old_body = std::mem::take(&mut func.body);
    let mut rename: HashMap<VReg, VReg> = HashMap::new();
    let mut new_body = Vec::with_capacity(old_body.len());

    for mut instr in old_body {
        instr.for_each_use_mut(|reg| {
            if let Some(&canonical) = rename.get(reg) {
                *reg = canonical;
            }
        });
        match &instr {
            Instr::Call {
                callee,
                args,
                results,
            } if applicable(callee) => {
                let candidate = &candidates[callee.as_str()];
                if args.len() != candidate.param_count
                    || results.len() != candidate.result_count
                {
                    return Err(TranslateError::TransformFailure {
                        symbol: caller.clone(),
                        reason: format!("call to '{callee}' has mismatched arity"),
                    });
                }

                // Parameters alias the argument registers; everything else
                // becomes a fresh register in the caller.
                let mut map: Vec<VReg> = Vec::with_capacity(candidate.vreg_types.len());
                for (i, &ty) in candidate.vreg_types.iter().enumerate() {
                    if i < candidate.param_count {
                        map.push(args[i]);
                    } else {
                        map.push(func.new_vreg(ty));
                    }
                }

                for body_instr in &candidate.body[..candidate.body.len() - 1] {
                    let mut spliced = body_instr.clone();
                    spliced.for_each_reg_mut(|reg| *reg = map[reg.0 as usize]);
                    new_body.push(spliced);
                }

                let Some(Instr::Return { values }) = candidate.body.last() else {
                    unreachable!("candidates end in a return");
                };
                for (result, returned) in results.iter().zip(values) {
                    rename.insert(*result, map[returned.0 as usize]);
                }
            }
            _ => new_body.push(instr),
        }
    }

    func.body = new_body;
    Ok(true)
}
