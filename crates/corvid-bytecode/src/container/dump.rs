//! Human-readable structural dump of a loaded container.
//!
//! Sections appear in container order; optional tables that are absent from
//! the file do not appear in the dump either.

use std::fmt::Write as _;

use crate::type_system::format_type_code;

use super::defs::SigRef;
use super::module::{Module, SignaturesView};

/// Generate a structural text dump of the module.
pub fn dump(module: &Module) -> String {
    let mut out = String::new();
    let header = module.header();
    let strings = module.strings();
    let sigs = module.signatures();

    writeln!(out, "[module]").unwrap();
    writeln!(out, "name {:?}", module.name()).unwrap();
    writeln!(out, "version {}", header.version).unwrap();
    writeln!(out, "total_size {}", header.total_size).unwrap();
    out.push('\n');

    if let Some(imports) = module.imports() {
        writeln!(out, "[imported_functions]").unwrap();
        for (i, def) in imports.iter().enumerate() {
            writeln!(
                out,
                "I{i} {:?} {}",
                strings.get(def.full_name),
                format_signature(&sigs, def.signature),
            )
            .unwrap();
        }
        out.push('\n');
    }

    writeln!(out, "[exported_functions]").unwrap();
    for (i, def) in module.exports().iter().enumerate() {
        writeln!(
            out,
            "E{i} {:?} {} fn={}",
            strings.get(def.local_name),
            format_signature(&sigs, def.signature),
            def.internal_ordinal,
        )
        .unwrap();
    }
    out.push('\n');

    if let Some(internals) = module.internals() {
        writeln!(out, "[internal_functions]").unwrap();
        for (i, def) in internals.iter().enumerate() {
            writeln!(
                out,
                "F{i} {:?} {}",
                strings.get(def.local_name),
                format_signature(&sigs, def.signature),
            )
            .unwrap();
        }
        out.push('\n');
    }

    if let Some(state) = module.module_state() {
        writeln!(out, "[module_state]").unwrap();
        writeln!(out, "global_bytes_capacity {}", state.global_bytes_capacity).unwrap();
        writeln!(out, "global_ref_count {}", state.global_ref_count).unwrap();
        out.push('\n');
    }

    if let Some(rodata) = module.rodata() {
        writeln!(out, "[rodata_segments]").unwrap();
        for i in 0..rodata.len() {
            writeln!(out, "R{i} {} bytes", rodata.get(i).len()).unwrap();
        }
        out.push('\n');
    }

    writeln!(out, "[function_descriptors]").unwrap();
    for (i, desc) in module.descriptors().iter().enumerate() {
        writeln!(
            out,
            "F{i} offset={} length={} wregs={} rregs={}",
            desc.bytecode_offset,
            desc.bytecode_length,
            desc.word_register_count,
            desc.ref_register_count,
        )
        .unwrap();
    }
    out.push('\n');

    writeln!(out, "[bytecode_data]").unwrap();
    writeln!(out, "{} bytes", module.code().len()).unwrap();

    out
}

fn format_signature(sigs: &SignaturesView<'_>, sig: SigRef) -> String {
    let args: Vec<String> = sigs.arg_types(sig).map(format_type_code).collect();
    let results: Vec<String> = sigs.result_types(sig).map(format_type_code).collect();
    format!("({}) -> ({})", args.join(", "), results.join(", "))
}
