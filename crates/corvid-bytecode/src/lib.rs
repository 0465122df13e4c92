//! Container format and loader for Corvid bytecode modules.
//!
//! This crate contains:
//! - Container format definitions (Header, fixed-size metadata records)
//! - The module loader (`Module` plus zero-copy views over every table)
//! - Type-kind codes shared between the compiler and the runtime loader
//! - A human-readable structural dump of a loaded container

pub mod container;
pub mod type_system;

// Re-export commonly used items at crate root
pub use container::{
    ByteStorage, ExportFunctionDef, FunctionDescriptor, Header, ImportFunctionDef,
    InternalFunctionDef, MAGIC, Module, ModuleError, ModuleStateDef, RodataSegmentDef, RodataView,
    RwdataSegmentDef, SECTION_ALIGN, SectionOffsets, SigRef, SignaturesView, StringId,
    StringsView, TableRecord, TableView, VERSION, align_up, dump,
    flags,
};
pub use type_system::{RefObjectKind, TYPE_CODE_I32, format_type_code};
