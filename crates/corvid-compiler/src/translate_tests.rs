use crate::error::TranslateError;
use crate::ir::{
    ConstValue, Decl, Export, Function, ImportFunction, Instr, Module, RodataSegment, Signature,
    ValueType, VReg,
};
use crate::translate::{OutputFormat, TargetOptions, translate_module};

/// One import (`host.add`), one internal function computing a constant and
/// calling the import.
fn import_call_module() -> Module {
    Module {
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
            Decl::Func(Function {
                name: "main".to_string(),
                signature: Signature {
                    params: vec![],
                    results: vec![ValueType::I32],
                },
                vreg_types: vec![ValueType::I32; 3],
                body: vec![
                    Instr::ConstI32 {
                        dst: VReg(0),
                        value: 40,
                    },
                    Instr::ConstI32 {
                        dst: VReg(1),
                        value: 2,
                    },
                    Instr::Call {
                        callee: "host.add".to_string(),
                        args: vec![VReg(0), VReg(1)],
                        results: vec![VReg(2)],
                    },
                    Instr::Return {
                        values: vec![VReg(2)],
                    },
                ],
                ordinal: None,
            }),
        ],
    }
}

fn translate(module: &mut Module, options: &TargetOptions) -> Vec<u8> {
    let mut out = Vec::new();
    translate_module(module, options, &mut out).unwrap();
    out
}

fn load(bytes: Vec<u8>) -> corvid_bytecode::Module {
    corvid_bytecode::Module::from_bytes(bytes).unwrap()
}

#[test]
fn import_call_scenario() {
    let mut module = import_call_module();
    let container = load(translate(&mut module, &TargetOptions::default()));

    // No exports, one import with the i32 signature, one descriptor with
    // real bytecode and only word registers.
    assert!(container.exports().is_empty());

    let imports = container.imports().expect("import table present");
    assert_eq!(imports.len(), 1);
    let import = imports.get(0);
    assert_eq!(container.strings().get(import.full_name), "host.add");
    let sigs = container.signatures();
    let args: Vec<u32> = sigs.arg_types(import.signature).collect();
    let results: Vec<u32> = sigs.result_types(import.signature).collect();
    assert_eq!(args, vec![1, 1]);
    assert_eq!(results, vec![1]);

    assert_eq!(container.descriptors().len(), 1);
    let desc = container.descriptors().get(0);
    assert!(desc.bytecode_length > 0);
    assert!(desc.word_register_count >= 1);
    assert_eq!(desc.ref_register_count, 0);
}

#[test]
fn strip_symbols_omits_only_the_internal_table() {
    let mut module = import_call_module();
    module.decls.push(Decl::Export(Export {
        name: "run".to_string(),
        target: "main".to_string(),
        ordinal: None,
    }));

    let kept = load(translate(&mut module.clone(), &TargetOptions::default()));
    let stripped = load(translate(
        &mut module,
        &TargetOptions {
            strip_symbols: true,
            ..TargetOptions::default()
        },
    ));

    let internals = kept.internals().expect("table present when not stripping");
    assert_eq!(internals.len(), 1);
    assert_eq!(
        kept.strings().get(internals.get(0).local_name),
        "main"
    );
    assert!(stripped.internals().is_none());

    // Exports and descriptors are unchanged by stripping.
    assert_eq!(kept.exports().len(), stripped.exports().len());
    let kept_export = kept.exports().get(0);
    let stripped_export = stripped.exports().get(0);
    assert_eq!(
        kept.strings().get(kept_export.local_name),
        stripped.strings().get(stripped_export.local_name)
    );
    assert_eq!(
        kept_export.internal_ordinal,
        stripped_export.internal_ordinal
    );
    let kept_descs: Vec<_> = kept.descriptors().iter().collect();
    let stripped_descs: Vec<_> = stripped.descriptors().iter().collect();
    assert_eq!(kept_descs, stripped_descs);
}

#[test]
fn rodata_table_is_absent_when_no_segments_exist() {
    let mut module = import_call_module();
    let container = load(translate(&mut module, &TargetOptions::default()));
    assert!(container.rodata().is_none());
    assert!(container.module_state().is_none());
}

#[test]
fn rodata_entries_match_source_payloads() {
    let mut module = import_call_module();
    module.decls.push(Decl::Rodata(RodataSegment {
        name: "weights".to_string(),
        value: ConstValue::Words(vec![3, 1, 4, 1, 5]),
        ordinal: None,
    }));
    let container = load(translate(&mut module, &TargetOptions::default()));

    let rodata = container.rodata().expect("one segment");
    assert_eq!(rodata.len(), 1);
    let expected: Vec<u8> = [3i32, 1, 4, 1, 5]
        .iter()
        .flat_map(|w| w.to_le_bytes())
        .collect();
    assert_eq!(rodata.get(0), expected.as_slice());
}

#[test]
fn descriptors_tile_the_bytecode_blob() {
    let mut module = import_call_module();
    // Two more functions so offsets actually accumulate.
    for (i, name) in ["second", "third"].iter().enumerate() {
        module.decls.push(Decl::Func(Function {
            name: name.to_string(),
            signature: Signature {
                params: vec![],
                results: vec![ValueType::I32],
            },
            vreg_types: vec![ValueType::I32],
            body: vec![
                Instr::ConstI32 {
                    dst: VReg(0),
                    value: i as i32,
                },
                Instr::Return {
                    values: vec![VReg(0)],
                },
            ],
            ordinal: None,
        }));
    }
    let container = load(translate(&mut module, &TargetOptions::default()));

    let descriptors: Vec<_> = container.descriptors().iter().collect();
    assert_eq!(descriptors.len(), 3);
    let mut expected_offset = 0u32;
    for desc in &descriptors {
        assert_eq!(desc.bytecode_offset, expected_offset);
        assert!(desc.bytecode_length > 0);
        expected_offset += desc.bytecode_length;
    }
    assert_eq!(expected_offset as usize, container.code().len());
}

#[test]
fn source_text_skips_the_builder() {
    let mut module = import_call_module();
    let mut out = Vec::new();
    translate_module(
        &mut module,
        &TargetOptions {
            output_format: OutputFormat::SourceText,
            ..TargetOptions::default()
        },
        &mut out,
    )
    .unwrap();

    let text = String::from_utf8(out).unwrap();
    // Annotated IR, not a container.
    assert!(text.starts_with("module @demo {"), "{text}");
    assert!(text.contains("import @host.add"), "{text}");
    assert!(text.contains("wregs=3 rregs=0"), "{text}");
    assert!(text.contains("%0 -> w0"), "{text}");
    assert!(corvid_bytecode::Module::from_bytes(text.into_bytes()).is_err());
}

#[test]
fn text_dump_renders_the_container_structure() {
    let mut module = import_call_module();
    let mut out = Vec::new();
    translate_module(
        &mut module,
        &TargetOptions {
            output_format: OutputFormat::TextDump,
            ..TargetOptions::default()
        },
        &mut out,
    )
    .unwrap();

    let text = String::from_utf8(out).unwrap();
    assert!(text.contains("[module]"), "{text}");
    assert!(text.contains("name \"demo\""), "{text}");
    assert!(text.contains("[imported_functions]"), "{text}");
    assert!(text.contains("\"host.add\" (i32, i32) -> (i32)"), "{text}");
    assert!(text.contains("[function_descriptors]"), "{text}");
    // No rodata section, so the dump must not mention one.
    assert!(!text.contains("[rodata_segments]"), "{text}");
}

#[test]
fn stripping_debug_ops_rejects_trace_instructions() {
    let mut module = import_call_module();
    if let Decl::Func(func) = &mut module.decls[1] {
        func.body.insert(
            0,
            Instr::Trace {
                message: "entry".to_string(),
                values: vec![],
            },
        );
    }
    let mut out = Vec::new();
    let err = translate_module(
        &mut module,
        &TargetOptions {
            strip_debug_ops: true,
            ..TargetOptions::default()
        },
        &mut out,
    )
    .unwrap_err();

    match err {
        TranslateError::IllegalConstruct { function, .. } => assert_eq!(function, "main"),
        other => panic!("expected IllegalConstruct, got {other:?}"),
    }
    // Fail fast: nothing was written.
    assert!(out.is_empty());
}

#[test]
fn binary_output_round_trips_through_the_loader() {
    let mut module = import_call_module();
    let bytes = translate(&mut module, &TargetOptions::default());
    let container = load(bytes);
    assert_eq!(container.name(), "demo");
    assert_eq!(container.header().version, corvid_bytecode::VERSION);
}
