use super::{StringTableBuilder, SigTableBuilder, build_module};
use crate::canonicalize::canonicalize;
use crate::error::TranslateError;
use crate::ir::{
    ConstValue, Decl, Function, GlobalWord, Instr, Module, RefObjectKind, RodataSegment,
    Signature, ValueType, VReg,
};
use crate::translate::TargetOptions;

fn simple_module() -> Module {
    Module {
        name: "demo".to_string(),
        decls: vec![Decl::Func(Function {
            name: "main".to_string(),
            signature: Signature {
                params: vec![],
                results: vec![ValueType::I32],
            },
            vreg_types: vec![ValueType::I32],
            body: vec![
                Instr::ConstI32 {
                    dst: VReg(0),
                    value: 7,
                },
                Instr::Return {
                    values: vec![VReg(0)],
                },
            ],
            ordinal: None,
        })],
    }
}

#[test]
fn string_table_interns_and_deduplicates() {
    let mut strings = StringTableBuilder::new();
    let a = strings.intern("demo").unwrap();
    let b = strings.intern("main").unwrap();
    let c = strings.intern("demo").unwrap();
    assert_eq!(a.get(), 0);
    assert_eq!(b.get(), 1);
    assert_eq!(a, c);
    assert_eq!(strings.len(), 2);

    let (blob, table) = strings.emit();
    assert_eq!(blob, b"demomain".to_vec());
    // count+1 offsets: 0, 4, 8
    assert_eq!(table.len(), 12);
    assert_eq!(&table[4..8], &4u32.to_le_bytes());
    assert_eq!(&table[8..12], &8u32.to_le_bytes());
}

#[test]
fn sig_table_deduplicates_identical_signatures() {
    let mut sigs = SigTableBuilder::new();
    let a = sigs.add(vec![1, 1], vec![1]).unwrap();
    let b = sigs.add(vec![1, 1], vec![1]).unwrap();
    let c = sigs.add(vec![1], vec![]).unwrap();
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(sigs.len(), 4);
    assert_eq!(a.arg_start, 0);
    assert_eq!(a.arg_count, 2);
    assert_eq!(a.result_start, 2);
    assert_eq!(a.result_count, 1);
}

#[test]
fn builds_a_loadable_container() {
    let mut module = simple_module();
    canonicalize(&mut module, &TargetOptions::default()).unwrap();
    let bytes = build_module(&module, &TargetOptions::default()).unwrap();

    let loaded = corvid_bytecode::Module::from_bytes(bytes).unwrap();
    assert_eq!(loaded.name(), "demo");
    assert_eq!(loaded.descriptors().len(), 1);
    let desc = loaded.descriptors().get(0);
    assert_eq!(desc.bytecode_offset, 0);
    assert_eq!(desc.bytecode_length as usize, loaded.code().len());
}

#[test]
fn fails_without_assigned_ordinals() {
    // Builder called without canonicalization: the ordinal check trips.
    let module = simple_module();
    let err = build_module(&module, &TargetOptions::default()).unwrap_err();
    match err {
        TranslateError::BuildFailure { module, reason } => {
            assert_eq!(module, "demo");
            assert!(reason.contains("no assigned ordinal"), "{reason}");
        }
        other => panic!("expected BuildFailure, got {other:?}"),
    }
}

#[test]
fn opaque_ref_in_signature_is_invalid_type() {
    let mut module = Module {
        name: "m".to_string(),
        decls: vec![Decl::Func(Function {
            name: "f".to_string(),
            signature: Signature {
                params: vec![ValueType::Ref(RefObjectKind::Opaque)],
                results: vec![],
            },
            vreg_types: vec![ValueType::Ref(RefObjectKind::Opaque)],
            body: vec![Instr::Return { values: vec![] }],
            ordinal: None,
        })],
    };
    canonicalize(&mut module, &TargetOptions::default()).unwrap();
    let err = build_module(&module, &TargetOptions::default()).unwrap_err();
    match err {
        TranslateError::InvalidType { symbol, type_name } => {
            assert_eq!(symbol, "f");
            assert_eq!(type_name, "ref<opaque>");
        }
        other => panic!("expected InvalidType, got {other:?}"),
    }
}

#[test]
fn module_state_reflects_global_counts() {
    let mut module = simple_module();
    module.decls.push(Decl::GlobalWord(GlobalWord {
        name: "a".to_string(),
        init: 0,
        ordinal: None,
    }));
    module.decls.push(Decl::GlobalWord(GlobalWord {
        name: "b".to_string(),
        init: 3,
        ordinal: None,
    }));
    canonicalize(&mut module, &TargetOptions::default()).unwrap();
    let bytes = build_module(&module, &TargetOptions::default()).unwrap();
    let loaded = corvid_bytecode::Module::from_bytes(bytes).unwrap();

    let state = loaded.module_state().expect("globals reserve module state");
    assert_eq!(state.global_bytes_capacity, 8);
    assert_eq!(state.global_ref_count, 0);
}

#[test]
fn rodata_payloads_survive_byte_for_byte() {
    let mut module = simple_module();
    module.decls.push(Decl::Rodata(RodataSegment {
        name: "tab".to_string(),
        value: ConstValue::Bytes(vec![0xde, 0xad, 0xbe, 0xef]),
        ordinal: None,
    }));
    module.decls.push(Decl::Rodata(RodataSegment {
        name: "msg".to_string(),
        value: ConstValue::Utf8("hello".to_string()),
        ordinal: None,
    }));
    canonicalize(&mut module, &TargetOptions::default()).unwrap();
    let bytes = build_module(&module, &TargetOptions::default()).unwrap();
    let loaded = corvid_bytecode::Module::from_bytes(bytes).unwrap();

    let rodata = loaded.rodata().expect("segments present");
    assert_eq!(rodata.len(), 2);
    assert_eq!(rodata.get(0), &[0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(rodata.get(1), b"hello");
}
