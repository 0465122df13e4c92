//! Binary module container.
//!
//! Layout: a fixed 64-byte header followed by 64-byte-aligned sections,
//! metadata first, bulk payloads last:
//!
//! Header → StrBlob → StrTable → SigPool → Imports → Exports → Internals →
//! ModuleState → RwdataTable → RodataTable → FunctionDescriptors →
//! BytecodeData → RodataBlob
//!
//! Placing the large blobs at the end keeps the pages touched during module
//! preparation down to the metadata prefix when the file is memory-mapped.

mod defs;
mod dump;
mod header;
mod module;

#[cfg(test)]
mod header_tests;
#[cfg(test)]
mod module_tests;

pub use defs::{
    ExportFunctionDef, FunctionDescriptor, ImportFunctionDef, InternalFunctionDef, ModuleStateDef,
    RodataSegmentDef, RwdataSegmentDef, SigRef, StringId, TableRecord,
};
pub use dump::dump;
pub use header::{Header, SectionOffsets, align_up, flags};
pub use module::{
    ByteStorage, Module, ModuleError, RodataView, SignaturesView, StringsView, TableView,
};

/// Magic bytes identifying a Corvid bytecode module file.
pub const MAGIC: [u8; 4] = *b"CVBM";

/// Container format version.
pub const VERSION: u32 = 1;

/// Every section starts on a multiple of this many bytes.
pub const SECTION_ALIGN: usize = 64;
