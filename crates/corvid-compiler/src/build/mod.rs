//! Container assembly.
//!
//! Order of work mirrors the file layout's intent: rodata payloads and
//! function bytecode are produced first (they become the trailing bulk
//! sections), then the metadata tables are built and everything is written
//! out with the metadata at the front. The builder never emits a partial
//! container; the first failure aborts with the offending symbol.

mod sig_table;
mod string_table;

#[cfg(test)]
mod build_tests;

pub use sig_table::SigTableBuilder;
pub use string_table::StringTableBuilder;

use std::collections::HashMap;

use corvid_bytecode::{
    ExportFunctionDef, FunctionDescriptor, Header, ImportFunctionDef, InternalFunctionDef,
    ModuleStateDef, RodataSegmentDef, SECTION_ALIGN, SigRef, TYPE_CODE_I32, TableRecord, flags,
};

use crate::counts::{SymbolCounts, count_symbols};
use crate::encode::{SymbolIndex, encode_function, serialize_constant};
use crate::error::{TranslateError, TranslateResult};
use crate::ir::{Decl, Export, Function, ImportFunction, Module, RodataSegment, Signature, ValueType};
use crate::regalloc::allocate;
use crate::translate::TargetOptions;

/// Assemble the binary container for a canonicalized module.
pub fn build_module(module: &Module, options: &TargetOptions) -> TranslateResult<Vec<u8>> {
    let fail = |reason: String| TranslateError::BuildFailure {
        module: module.name.clone(),
        reason,
    };

    let counts = count_symbols(module);
    counts.verify(module).map_err(&fail)?;

    let (imports, exports, internals, rodatas) = collect_by_ordinal(module, &counts);

    // Bulk payloads first: rodata, then per-function bytecode with running
    // offsets.
    let mut rodata_defs: Vec<RodataSegmentDef> = Vec::with_capacity(rodatas.len());
    let mut rodata_blob: Vec<u8> = Vec::new();
    for segment in &rodatas {
        let payload =
            serialize_constant(&segment.value).map_err(|source| TranslateError::EncodingFailure {
                symbol: segment.name.clone(),
                source,
            })?;
        let offset = u32::try_from(rodata_blob.len())
            .map_err(|_| fail("rodata blob exceeds 4 GiB".to_string()))?;
        rodata_defs.push(RodataSegmentDef {
            offset,
            length: payload.len() as u32,
        });
        rodata_blob.extend_from_slice(&payload);
    }

    let symbols = SymbolIndex::build(module);
    let mut descriptors: Vec<FunctionDescriptor> = Vec::with_capacity(internals.len());
    let mut bytecode_blob: Vec<u8> = Vec::new();
    for func in &internals {
        let alloc = allocate(func).map_err(|source| TranslateError::LivenessFailure {
            function: func.name.clone(),
            source,
        })?;
        let encoded =
            encode_function(func, &symbols, &alloc).map_err(|source| {
                TranslateError::EncodingFailure {
                    symbol: func.name.clone(),
                    source,
                }
            })?;
        let bytecode_offset = u32::try_from(bytecode_blob.len())
            .map_err(|_| fail("bytecode blob exceeds 4 GiB".to_string()))?;
        descriptors.push(FunctionDescriptor {
            bytecode_offset,
            bytecode_length: encoded.bytecode.len() as u32,
            word_register_count: encoded.word_register_count,
            ref_register_count: encoded.ref_register_count,
        });
        bytecode_blob.extend_from_slice(&encoded.bytecode);
    }

    // Metadata tables. The module name is interned first so it is string 0.
    let mut strings = StringTableBuilder::new();
    let mut sigs = SigTableBuilder::new();
    strings.intern(&module.name).map_err(&fail)?;

    let mut import_defs: Vec<ImportFunctionDef> = Vec::with_capacity(imports.len());
    for import in &imports {
        let full_name = strings.intern(&import.name).map_err(&fail)?;
        let signature = signature_ref(&mut sigs, &import.signature, &import.name, &fail)?;
        import_defs.push(ImportFunctionDef {
            full_name,
            signature,
        });
    }

    let by_name: HashMap<&str, &Function> =
        internals.iter().map(|f| (f.name.as_str(), *f)).collect();
    let mut export_defs: Vec<ExportFunctionDef> = Vec::with_capacity(exports.len());
    for export in &exports {
        let target = by_name.get(export.target.as_str()).ok_or_else(|| {
            fail(format!(
                "export '{}' targets unknown internal function '{}'",
                export.name, export.target
            ))
        })?;
        let local_name = strings.intern(&export.name).map_err(&fail)?;
        let signature = signature_ref(&mut sigs, &target.signature, &export.name, &fail)?;
        export_defs.push(ExportFunctionDef {
            local_name,
            signature,
            internal_ordinal: target.ordinal.expect("ordinals verified above"),
        });
    }

    let mut internal_defs: Vec<InternalFunctionDef> = Vec::new();
    if !options.strip_symbols {
        internal_defs.reserve(internals.len());
        for func in &internals {
            let local_name = strings.intern(&func.name).map_err(&fail)?;
            let signature = signature_ref(&mut sigs, &func.signature, &func.name, &fail)?;
            internal_defs.push(InternalFunctionDef {
                local_name,
                signature,
            });
        }
    }

    // Section byte images.
    let (str_blob, str_table) = strings.emit();
    let sig_pool = sigs.emit();
    let import_bytes = table_bytes(&import_defs);
    let export_bytes = table_bytes(&export_defs);
    let internal_bytes = table_bytes(&internal_defs);
    let rodata_table_bytes = table_bytes(&rodata_defs);
    let descriptor_bytes = table_bytes(&descriptors);

    let mut flags_value = 0u32;
    if !import_defs.is_empty() {
        flags_value |= flags::HAS_IMPORTS;
    }
    if !options.strip_symbols {
        flags_value |= flags::HAS_INTERNAL_NAMES;
    }
    if counts.global_words > 0 || counts.global_refs > 0 {
        flags_value |= flags::HAS_MODULE_STATE;
    }
    if !rodata_defs.is_empty() {
        flags_value |= flags::HAS_RODATA;
    }

    let mut module_state_bytes = Vec::new();
    if flags_value & flags::HAS_MODULE_STATE != 0 {
        let state = ModuleStateDef {
            global_bytes_capacity: (counts.global_words as u32) * 4,
            global_ref_count: counts.global_refs as u32,
        };
        state.write_to(&mut module_state_bytes);
    }

    // Assemble: metadata near the front, blobs at the end.
    let mut out = vec![0u8; 64];
    emit_section(&mut out, &str_blob);
    emit_section(&mut out, &str_table);
    emit_section(&mut out, &sig_pool);
    emit_section(&mut out, &import_bytes);
    emit_section(&mut out, &export_bytes);
    emit_section(&mut out, &internal_bytes);
    emit_section(&mut out, &module_state_bytes);
    emit_section(&mut out, &[]); // rwdata table, reserved
    emit_section(&mut out, &rodata_table_bytes);
    emit_section(&mut out, &descriptor_bytes);
    emit_section(&mut out, &bytecode_blob);
    emit_section(&mut out, &rodata_blob);
    pad_to_section(&mut out);

    let total_size =
        u32::try_from(out.len()).map_err(|_| fail("container exceeds 4 GiB".to_string()))?;

    let mut header = Header {
        total_size,
        flags: flags_value,
        str_blob_size: str_blob.len() as u32,
        bytecode_size: bytecode_blob.len() as u32,
        rodata_blob_size: rodata_blob.len() as u32,
        str_table_count: table_count(strings.len(), "string", &fail)?,
        sig_pool_count: table_count(sigs.len(), "signature pool", &fail)?,
        import_count: table_count(import_defs.len(), "import", &fail)?,
        export_count: table_count(export_defs.len(), "export", &fail)?,
        internal_count: table_count(internal_defs.len(), "internal function", &fail)?,
        rwdata_count: 0,
        rodata_count: table_count(rodata_defs.len(), "rodata segment", &fail)?,
        descriptor_count: table_count(descriptors.len(), "function descriptor", &fail)?,
        ..Default::default()
    };
    header.checksum = crc32fast::hash(&out[64..]);
    out[..64].copy_from_slice(&header.to_bytes());

    Ok(out)
}

/// Place each symbol at its ordinal. Ordinal contiguity was verified, so
/// every slot fills exactly once.
fn collect_by_ordinal<'a>(
    module: &'a Module,
    counts: &SymbolCounts,
) -> (
    Vec<&'a ImportFunction>,
    Vec<&'a Export>,
    Vec<&'a Function>,
    Vec<&'a RodataSegment>,
) {
    let mut imports: Vec<Option<&ImportFunction>> = vec![None; counts.import_funcs];
    let mut exports: Vec<Option<&Export>> = vec![None; counts.export_funcs];
    let mut internals: Vec<Option<&Function>> = vec![None; counts.internal_funcs];
    let mut rodatas: Vec<Option<&RodataSegment>> = vec![None; counts.rodata_segments];

    let ordinal = |o: Option<u32>| o.expect("ordinals verified above") as usize;
    for decl in &module.decls {
        match decl {
            Decl::Import(d) => imports[ordinal(d.ordinal)] = Some(d),
            Decl::Export(d) => exports[ordinal(d.ordinal)] = Some(d),
            Decl::Func(d) => internals[ordinal(d.ordinal)] = Some(d),
            Decl::Rodata(d) => rodatas[ordinal(d.ordinal)] = Some(d),
            Decl::GlobalWord(_) | Decl::GlobalRef(_) => {}
        }
    }

    (
        unwrap_all(imports),
        unwrap_all(exports),
        unwrap_all(internals),
        unwrap_all(rodatas),
    )
}

fn unwrap_all<T>(slots: Vec<Option<&T>>) -> Vec<&T> {
    slots
        .into_iter()
        .map(|slot| slot.expect("ordinals verified above"))
        .collect()
}

/// Map a signature to pooled wire codes, or fail with `InvalidType`
/// attributed to `symbol`.
fn signature_ref(
    sigs: &mut SigTableBuilder,
    signature: &Signature,
    symbol: &str,
    fail: &impl Fn(String) -> TranslateError,
) -> TranslateResult<SigRef> {
    let codes = |types: &[ValueType]| -> TranslateResult<Vec<u32>> {
        types
            .iter()
            .map(|&ty| {
                wire_type_code(ty).ok_or_else(|| TranslateError::InvalidType {
                    symbol: symbol.to_string(),
                    type_name: ty.to_string(),
                })
            })
            .collect()
    };
    let args = codes(&signature.params)?;
    let results = codes(&signature.results)?;
    sigs.add(args, results).map_err(fail)
}

/// The wire code of a type, or `None` when the type has no stable mapping.
fn wire_type_code(ty: ValueType) -> Option<u32> {
    match ty {
        ValueType::I32 => Some(TYPE_CODE_I32),
        ValueType::Ref(kind) => kind.code(),
    }
}

fn table_bytes<T: TableRecord>(records: &[T]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(records.len() * T::SIZE);
    for record in records {
        record.write_to(&mut bytes);
    }
    bytes
}

fn table_count(
    len: usize,
    what: &str,
    fail: &impl Fn(String) -> TranslateError,
) -> TranslateResult<u16> {
    u16::try_from(len).map_err(|_| fail(format!("{what} table exceeds {} entries", u16::MAX)))
}

/// Pad to the section boundary, then append the section's bytes.
fn emit_section(out: &mut Vec<u8>, data: &[u8]) {
    pad_to_section(out);
    out.extend_from_slice(data);
}

fn pad_to_section(buf: &mut Vec<u8>) {
    let rem = buf.len() % SECTION_ALIGN;
    if rem != 0 {
        buf.resize(buf.len() + SECTION_ALIGN - rem, 0);
    }
}
