use super::*;

fn add_fn() -> Function {
    Function {
        name: "sum".to_string(),
        signature: Signature {
            params: vec![ValueType::I32, ValueType::I32],
            results: vec![ValueType::I32],
        },
        vreg_types: vec![ValueType::I32, ValueType::I32, ValueType::I32],
        body: vec![
            Instr::AddI32 {
                dst: VReg(2),
                lhs: VReg(0),
                rhs: VReg(1),
            },
            Instr::Return {
                values: vec![VReg(2)],
            },
        ],
        ordinal: None,
    }
}

#[test]
fn defs_and_uses() {
    let call = Instr::Call {
        callee: "f".to_string(),
        args: vec![VReg(0), VReg(1)],
        results: vec![VReg(2)],
    };
    assert_eq!(call.defs(), vec![VReg(2)]);
    assert_eq!(call.uses(), vec![VReg(0), VReg(1)]);

    let store = Instr::GlobalStoreI32 {
        global: "g".to_string(),
        src: VReg(3),
    };
    assert!(store.defs().is_empty());
    assert_eq!(store.uses(), vec![VReg(3)]);
    assert!(store.has_side_effect());
}

#[test]
fn debug_classification() {
    assert!(Instr::Break.is_debug());
    assert!(
        Instr::Trace {
            message: "m".to_string(),
            values: vec![],
        }
        .is_debug()
    );
    assert!(
        !Instr::ConstI32 {
            dst: VReg(0),
            value: 1,
        }
        .is_debug()
    );
}

#[test]
fn new_vreg_extends_type_table() {
    let mut func = add_fn();
    let reg = func.new_vreg(ValueType::Ref(RefObjectKind::Buffer));
    assert_eq!(reg, VReg(3));
    assert!(func.vreg_types[3].is_ref());
}

#[test]
fn renders_function_text() {
    let text = add_fn().to_string();
    assert!(text.contains("func @sum : (i32, i32) -> (i32) {"));
    assert!(text.contains("%2 = add.i32 %0, %1"));
    assert!(text.contains("return %2"));
}

#[test]
fn module_round_trips_through_json() {
    let module = Module {
        name: "demo".to_string(),
        decls: vec![
            Decl::Import(ImportFunction {
                name: "host.add".to_string(),
                signature: Signature {
                    params: vec![ValueType::I32, ValueType::I32],
                    results: vec![ValueType::I32],
                },
                ordinal: None,
            }),
            Decl::Func(add_fn()),
            Decl::Rodata(RodataSegment {
                name: "tab".to_string(),
                value: ConstValue::Words(vec![1, 2, 3]),
                ordinal: None,
            }),
        ],
    };
    let json = serde_json::to_string(&module).unwrap();
    let back: Module = serde_json::from_str(&json).unwrap();
    assert_eq!(back, module);
}
