use super::liveness::{LiveInterval, LivenessError, compute_intervals};
use crate::ir::{Function, Instr, Signature, ValueType, VReg};

fn func(params: Vec<ValueType>, vreg_types: Vec<ValueType>, body: Vec<Instr>) -> Function {
    Function {
        name: "f".to_string(),
        signature: Signature {
            params,
            results: vec![],
        },
        vreg_types,
        body,
        ordinal: None,
    }
}

#[test]
fn straight_line_intervals() {
    // %0 = const 1        (0)
    // %1 = const 2        (1)
    // %2 = add %0, %1     (2)
    // return %2           (3)
    let f = func(
        vec![],
        vec![ValueType::I32; 3],
        vec![
            Instr::ConstI32 {
                dst: VReg(0),
                value: 1,
            },
            Instr::ConstI32 {
                dst: VReg(1),
                value: 2,
            },
            Instr::AddI32 {
                dst: VReg(2),
                lhs: VReg(0),
                rhs: VReg(1),
            },
            Instr::Return {
                values: vec![VReg(2)],
            },
        ],
    );
    let intervals = compute_intervals(&f).unwrap();
    assert_eq!(
        intervals,
        vec![
            LiveInterval {
                vreg: VReg(0),
                start: 0,
                end: 2
            },
            LiveInterval {
                vreg: VReg(1),
                start: 1,
                end: 2
            },
            LiveInterval {
                vreg: VReg(2),
                start: 2,
                end: 3
            },
        ]
    );
}

#[test]
fn parameters_live_from_entry() {
    let f = func(
        vec![ValueType::I32, ValueType::I32],
        vec![ValueType::I32; 3],
        vec![
            Instr::AddI32 {
                dst: VReg(2),
                lhs: VReg(0),
                rhs: VReg(1),
            },
            Instr::Return {
                values: vec![VReg(2)],
            },
        ],
    );
    let intervals = compute_intervals(&f).unwrap();
    assert_eq!(intervals[0], LiveInterval {
        vreg: VReg(0),
        start: 0,
        end: 0
    });
    assert_eq!(intervals[1], LiveInterval {
        vreg: VReg(1),
        start: 0,
        end: 0
    });
}

#[test]
fn unused_def_gets_point_interval() {
    let f = func(
        vec![],
        vec![ValueType::I32],
        vec![Instr::ConstI32 {
            dst: VReg(0),
            value: 7,
        }],
    );
    let intervals = compute_intervals(&f).unwrap();
    assert_eq!(intervals, vec![LiveInterval {
        vreg: VReg(0),
        start: 0,
        end: 0
    }]);
}

#[test]
fn use_before_def_is_rejected() {
    let f = func(
        vec![],
        vec![ValueType::I32; 2],
        vec![Instr::AddI32 {
            dst: VReg(1),
            lhs: VReg(0),
            rhs: VReg(0),
        }],
    );
    assert_eq!(
        compute_intervals(&f).unwrap_err(),
        LivenessError::UseBeforeDef {
            vreg: VReg(0),
            index: 0
        }
    );
}

#[test]
fn redefinition_is_rejected() {
    let f = func(
        vec![],
        vec![ValueType::I32],
        vec![
            Instr::ConstI32 {
                dst: VReg(0),
                value: 1,
            },
            Instr::ConstI32 {
                dst: VReg(0),
                value: 2,
            },
        ],
    );
    assert_eq!(
        compute_intervals(&f).unwrap_err(),
        LivenessError::Redefinition {
            vreg: VReg(0),
            index: 1
        }
    );
}

#[test]
fn out_of_range_register_is_rejected() {
    let f = func(
        vec![],
        vec![ValueType::I32],
        vec![Instr::ConstI32 {
            dst: VReg(9),
            value: 1,
        }],
    );
    assert_eq!(
        compute_intervals(&f).unwrap_err(),
        LivenessError::OutOfRange {
            vreg: VReg(9),
            index: 0
        }
    );
}
