//! Per-function local optimizations.
//!
//! Each pass takes one function, returns whether it changed anything, and
//! preserves single-definition form: values made redundant are renamed to
//! their surviving equivalent and their defining instruction dropped, never
//! replaced with copies.

use std::collections::{HashMap, HashSet};

use crate::ir::{Function, Instr, VReg};

/// Fold arithmetic over known constants and strip identities.
pub fn fold_constants(func: &mut Function) -> bool {
    let mut consts: HashMap<VReg, i32> = HashMap::new();
    let mut rename: HashMap<VReg, VReg> = HashMap::new();
    let mut out = Vec::with_capacity(func.body.len());
    let mut changed = false;

    for mut instr in func.body.drain(..) {
        apply_rename(&mut instr, &rename);
        match instr {
            Instr::ConstI32 { dst, value } => {
                consts.insert(dst, value);
                out.push(instr);
            }
            Instr::AddI32 { dst, lhs, rhs } => {
                match (consts.get(&lhs).copied(), consts.get(&rhs).copied()) {
                    (Some(a), Some(b)) => {
                        let value = a.wrapping_add(b);
                        consts.insert(dst, value);
                        out.push(Instr::ConstI32 { dst, value });
                        changed = true;
                    }
                    (Some(0), _) => {
                        rename.insert(dst, rhs);
                        changed = true;
                    }
                    (_, Some(0)) => {
                        rename.insert(dst, lhs);
                        changed = true;
                    }
                    _ => out.push(instr),
                }
            }
            Instr::SubI32 { dst, lhs, rhs } => {
                match (consts.get(&lhs).copied(), consts.get(&rhs).copied()) {
                    (Some(a), Some(b)) => {
                        let value = a.wrapping_sub(b);
                        consts.insert(dst, value);
                        out.push(Instr::ConstI32 { dst, value });
                        changed = true;
                    }
                    (_, Some(0)) => {
                        rename.insert(dst, lhs);
                        changed = true;
                    }
                    _ => out.push(instr),
                }
            }
            Instr::MulI32 { dst, lhs, rhs } => {
                match (consts.get(&lhs).copied(), consts.get(&rhs).copied()) {
                    (Some(a), Some(b)) => {
                        let value = a.wrapping_mul(b);
                        consts.insert(dst, value);
                        out.push(Instr::ConstI32 { dst, value });
                        changed = true;
                    }
                    (Some(1), _) => {
                        rename.insert(dst, rhs);
                        changed = true;
                    }
                    (_, Some(1)) => {
                        rename.insert(dst, lhs);
                        changed = true;
                    }
                    _ => out.push(instr),
                }
            }
            _ => out.push(instr),
        }
    }

    func.body = out;
    changed
}

/// Key identifying a pure computation for value numbering.
#[derive(Clone, PartialEq, Eq, Hash)]
enum ExprKey {
    Const(i32),
    ConstRef(String),
    Add(VReg, VReg),
    Sub(VReg, VReg),
    Mul(VReg, VReg),
}

/// Replace recomputations of an already-available pure value with the
/// original. Loads are not deduplicated; stores may change them.
pub fn eliminate_common_subexpressions(func: &mut Function) -> bool {
    let mut available: HashMap<ExprKey, VReg> = HashMap::new();
    let mut rename: HashMap<VReg, VReg> = HashMap::new();
    let mut out = Vec::with_capacity(func.body.len());
    let mut changed = false;

    for mut instr in func.body.drain(..) {
        apply_rename(&mut instr, &rename);
        let key = match &instr {
            Instr::ConstI32 { value, .. } => Some(ExprKey::Const(*value)),
            Instr::ConstRef { rodata, .. } => Some(ExprKey::ConstRef(rodata.clone())),
            Instr::AddI32 { lhs, rhs, .. } => Some(ExprKey::Add(*lhs, *rhs)),
            Instr::SubI32 { lhs, rhs, .. } => Some(ExprKey::Sub(*lhs, *rhs)),
            Instr::MulI32 { lhs, rhs, .. } => Some(ExprKey::Mul(*lhs, *rhs)),
            _ => None,
        };
        match key {
            Some(key) => {
                let dst = instr.defs()[0];
                if let Some(&original) = available.get(&key) {
                    rename.insert(dst, original);
                    changed = true;
                } else {
                    available.insert(key, dst);
                    out.push(instr);
                }
            }
            None => out.push(instr),
        }
    }

    func.body = out;
    changed
}

/// Drop pure instructions whose results are never read. Runs to its own
/// fixpoint so dead chains disappear in one call.
pub fn remove_dead_code(func: &mut Function) -> bool {
    let mut changed = false;
    loop {
        let used: HashSet<VReg> = func
            .body
            .iter()
            .flat_map(|instr| instr.uses())
            .collect();
        let before = func.body.len();
        func.body.retain(|instr| {
            instr.has_side_effect() || instr.defs().iter().any(|d| used.contains(d))
        });
        if func.body.len() == before {
            return changed;
        }
        changed = true;
    }
}

fn apply_rename(instr: &mut Instr, rename: &HashMap<VReg, VReg>) {
    if rename.is_empty() {
        return;
    }
    instr.for_each_use_mut(|reg| {
        if let Some(&canonical) = rename.get(reg) {
            *reg = canonical;
        }
    });
}
