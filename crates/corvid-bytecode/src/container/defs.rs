//! Fixed-size metadata records.
//!
//! Every table in the container is a flat array of one of these records,
//! indexed by the symbol's ordinal. Records round-trip through
//! [`TableRecord::write_to`] / [`TableRecord::from_bytes`].

/// Index into the module's string table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StringId(u16);

impl StringId {
    pub fn new(raw: u16) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

/// A record stored in a fixed-size metadata table.
pub trait TableRecord: Sized {
    /// Encoded size in bytes.
    const SIZE: usize;

    /// Decode from `bytes[..Self::SIZE]`.
    fn from_bytes(bytes: &[u8]) -> Self;

    /// Append the encoded record to `out`.
    fn write_to(&self, out: &mut Vec<u8>);
}

#[inline]
fn read_u16_le(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

#[inline]
fn read_u32_le(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// Reference into the shared signature code pool.
///
/// Argument and result type codes live in one `u32` pool; each function def
/// records its two slices as (start, count) pairs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SigRef {
    pub arg_start: u16,
    pub arg_count: u16,
    pub result_start: u16,
    pub result_count: u16,
}

impl TableRecord for SigRef {
    const SIZE: usize = 8;

    fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            arg_start: read_u16_le(bytes, 0),
            arg_count: read_u16_le(bytes, 2),
            result_start: read_u16_le(bytes, 4),
            result_count: read_u16_le(bytes, 6),
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.arg_start.to_le_bytes());
        out.extend_from_slice(&self.arg_count.to_le_bytes());
        out.extend_from_slice(&self.result_start.to_le_bytes());
        out.extend_from_slice(&self.result_count.to_le_bytes());
    }
}

/// An imported function: full name plus signature.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImportFunctionDef {
    pub full_name: StringId,
    pub signature: SigRef,
}

impl TableRecord for ImportFunctionDef {
    const SIZE: usize = 12;

    fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            full_name: StringId::new(read_u16_le(bytes, 0)),
            signature: SigRef::from_bytes(&bytes[4..]),
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.full_name.get().to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // pad
        self.signature.write_to(out);
    }
}

/// An exported function: public name, signature, and the ordinal of the
/// internal function it aliases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExportFunctionDef {
    pub local_name: StringId,
    pub signature: SigRef,
    pub internal_ordinal: u32,
}

impl TableRecord for ExportFunctionDef {
    const SIZE: usize = 16;

    fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            local_name: StringId::new(read_u16_le(bytes, 0)),
            signature: SigRef::from_bytes(&bytes[4..]),
            internal_ordinal: read_u32_le(bytes, 12),
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.local_name.get().to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // pad
        self.signature.write_to(out);
        out.extend_from_slice(&self.internal_ordinal.to_le_bytes());
    }
}

/// An internal function's name and signature. The whole table is omitted
/// when symbols are stripped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InternalFunctionDef {
    pub local_name: StringId,
    pub signature: SigRef,
}

impl TableRecord for InternalFunctionDef {
    const SIZE: usize = 12;

    fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            local_name: StringId::new(read_u16_le(bytes, 0)),
            signature: SigRef::from_bytes(&bytes[4..]),
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.local_name.get().to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // pad
        self.signature.write_to(out);
    }
}

/// Mutable module state reservation: global word storage and ref slots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ModuleStateDef {
    pub global_bytes_capacity: u32,
    pub global_ref_count: u32,
}

impl TableRecord for ModuleStateDef {
    const SIZE: usize = 8;

    fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            global_bytes_capacity: read_u32_le(bytes, 0),
            global_ref_count: read_u32_le(bytes, 4),
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.global_bytes_capacity.to_le_bytes());
        out.extend_from_slice(&self.global_ref_count.to_le_bytes());
    }
}

/// A read-only data segment: its slice of the trailing rodata blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RodataSegmentDef {
    /// Byte offset relative to the rodata blob section.
    pub offset: u32,
    pub length: u32,
}

impl TableRecord for RodataSegmentDef {
    const SIZE: usize = 8;

    fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            offset: read_u32_le(bytes, 0),
            length: read_u32_le(bytes, 4),
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.offset.to_le_bytes());
        out.extend_from_slice(&self.length.to_le_bytes());
    }
}

/// A read-write data segment. Reserved: the compiler never emits these yet,
/// but the layout keeps a stable place for them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RwdataSegmentDef {
    pub offset: u32,
    pub length: u32,
}

impl TableRecord for RwdataSegmentDef {
    const SIZE: usize = 8;

    fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            offset: read_u32_le(bytes, 0),
            length: read_u32_le(bytes, 4),
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.offset.to_le_bytes());
        out.extend_from_slice(&self.length.to_le_bytes());
    }
}

/// Locates one internal function's bytecode and its register-bank usage.
///
/// Stored in ordinal order; offsets are running sums, so consecutive
/// descriptors tile the bytecode blob exactly.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub bytecode_offset: u32,
    pub bytecode_length: u32,
    pub word_register_count: u16,
    pub ref_register_count: u16,
}

impl TableRecord for FunctionDescriptor {
    const SIZE: usize = 12;

    fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytecode_offset: read_u32_le(bytes, 0),
            bytecode_length: read_u32_le(bytes, 4),
            word_register_count: read_u16_le(bytes, 8),
            ref_register_count: read_u16_le(bytes, 10),
        }
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.bytecode_offset.to_le_bytes());
        out.extend_from_slice(&self.bytecode_length.to_le_bytes());
        out.extend_from_slice(&self.word_register_count.to_le_bytes());
        out.extend_from_slice(&self.ref_register_count.to_le_bytes());
    }
}
