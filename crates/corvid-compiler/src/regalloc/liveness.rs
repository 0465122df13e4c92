//! Live interval computation.
//!
//! One def-use pass over the linear instruction sequence. Positions are
//! instruction indices; parameters count as defined at position 0. Each
//! virtual register gets the inclusive interval [definition, last use].

use crate::ir::{Function, VReg};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiveInterval {
    pub vreg: VReg,
    pub start: u32,
    /// Inclusive.
    pub end: u32,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LivenessError {
    #[error("{vreg} used at instruction {index} before any definition")]
    UseBeforeDef { vreg: VReg, index: usize },
    #[error("{vreg} redefined at instruction {index}")]
    Redefinition { vreg: VReg, index: usize },
    #[error("{vreg} at instruction {index} is outside the function's register table")]
    OutOfRange { vreg: VReg, index: usize },
}

/// Compute live intervals for every virtual register in the function.
pub fn compute_intervals(func: &Function) -> Result<Vec<LiveInterval>, LivenessError> {
    let reg_count = func.vreg_types.len();
    let mut def: Vec<Option<u32>> = vec![None; reg_count];
    let mut last_use: Vec<u32> = vec![0; reg_count];

    // Parameters arrive in registers at entry.
    for param in 0..func.signature.params.len() {
        def[param] = Some(0);
    }

    for (index, instr) in func.body.iter().enumerate() {
        let pos = index as u32;
        // Operands are read before the result is written.
        for vreg in instr.uses() {
            let slot = vreg.0 as usize;
            if slot >= reg_count {
                return Err(LivenessError::OutOfRange { vreg, index });
            }
            if def[slot].is_none() {
                return Err(LivenessError::UseBeforeDef { vreg, index });
            }
            last_use[slot] = last_use[slot].max(pos);
        }
        for vreg in instr.defs() {
            let slot = vreg.0 as usize;
            if slot >= reg_count {
                return Err(LivenessError::OutOfRange { vreg, index });
            }
            if def[slot].is_some() {
                return Err(LivenessError::Redefinition { vreg, index });
            }
            def[slot] = Some(pos);
            last_use[slot] = last_use[slot].max(pos);
        }
    }

    let mut intervals = Vec::new();
    for slot in 0..reg_count {
        if let Some(start) = def[slot] {
            intervals.push(LiveInterval {
                vreg: VReg(slot as u32),
                start,
                end: last_use[slot].max(start),
            });
        }
    }
    Ok(intervals)
}
