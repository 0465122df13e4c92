//! Container file header (64 bytes).
//!
//! Section offsets are not stored; they are recomputed from the counts and
//! blob sizes in the header. Optional tables are tracked by presence flags so
//! an absent table is distinguishable from a present-but-empty one.

use super::defs::{
    ExportFunctionDef, FunctionDescriptor, ImportFunctionDef, InternalFunctionDef, ModuleStateDef,
    RodataSegmentDef, RwdataSegmentDef, TableRecord,
};
use super::{MAGIC, SECTION_ALIGN, VERSION};

/// Presence flags for optional tables.
pub mod flags {
    /// Imported-function table is present.
    pub const HAS_IMPORTS: u32 = 1 << 0;
    /// Internal-function name/signature table is present (absent when
    /// symbols were stripped).
    pub const HAS_INTERNAL_NAMES: u32 = 1 << 1;
    /// Module-state record is present.
    pub const HAS_MODULE_STATE: u32 = 1 << 2;
    /// Rwdata segment table is present (reserved, never set today).
    pub const HAS_RWDATA: u32 = 1 << 3;
    /// Rodata segment table and blob are present.
    pub const HAS_RODATA: u32 = 1 << 4;
}

/// File header - first 64 bytes of the container.
///
/// - 0-15: identity (magic, version, checksum, total_size)
/// - 16-31: flags and blob sizes (4 × u32)
/// - 32-47: table counts (8 × u16) — order matches section order
/// - 48-63: reserved
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C, align(64))]
pub struct Header {
    /// Magic bytes: b"CVBM"
    pub magic: [u8; 4],
    /// Format version (currently 1)
    pub version: u32,
    /// CRC32 checksum of everything after the header
    pub checksum: u32,
    /// Total file size in bytes
    pub total_size: u32,

    /// Presence flags for optional tables (see [`flags`]).
    pub flags: u32,
    /// Size of the string blob in bytes.
    pub str_blob_size: u32,
    /// Size of the bytecode blob in bytes.
    pub bytecode_size: u32,
    /// Size of the rodata blob in bytes.
    pub rodata_blob_size: u32,

    pub str_table_count: u16,
    pub sig_pool_count: u16,
    pub import_count: u16,
    pub export_count: u16,
    pub internal_count: u16,
    pub rwdata_count: u16,
    pub rodata_count: u16,
    pub descriptor_count: u16,

    // Public for cross-crate struct initialization.
    pub _reserved: [u8; 16],
}

const _: () = assert!(std::mem::size_of::<Header>() == 64);

impl Default for Header {
    fn default() -> Self {
        Self {
            magic: MAGIC,
            version: VERSION,
            checksum: 0,
            total_size: 0,
            flags: 0,
            str_blob_size: 0,
            bytecode_size: 0,
            rodata_blob_size: 0,
            str_table_count: 0,
            sig_pool_count: 0,
            import_count: 0,
            export_count: 0,
            internal_count: 0,
            rwdata_count: 0,
            rodata_count: 0,
            descriptor_count: 0,
            _reserved: [0; 16],
        }
    }
}

/// Computed section offsets derived from header counts and blob sizes.
///
/// Order: StrBlob → StrTable → SigPool → Imports → Exports → Internals →
/// ModuleState → RwdataTable → RodataTable → Descriptors → Bytecode →
/// RodataBlob
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SectionOffsets {
    pub str_blob: u32,
    pub str_table: u32,
    pub sig_pool: u32,
    pub imports: u32,
    pub exports: u32,
    pub internals: u32,
    pub module_state: u32,
    pub rwdata_table: u32,
    pub rodata_table: u32,
    pub descriptors: u32,
    pub bytecode: u32,
    pub rodata_blob: u32,
}

impl Header {
    /// Decode header from 64 bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert!(bytes.len() >= 64, "header too short");

        let mut reserved = [0u8; 16];
        reserved.copy_from_slice(&bytes[48..64]);

        Self {
            magic: [bytes[0], bytes[1], bytes[2], bytes[3]],
            version: u32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]),
            checksum: u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]),
            total_size: u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]),
            flags: u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]),
            str_blob_size: u32::from_le_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]),
            bytecode_size: u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]),
            rodata_blob_size: u32::from_le_bytes([bytes[28], bytes[29], bytes[30], bytes[31]]),
            str_table_count: u16::from_le_bytes([bytes[32], bytes[33]]),
            sig_pool_count: u16::from_le_bytes([bytes[34], bytes[35]]),
            import_count: u16::from_le_bytes([bytes[36], bytes[37]]),
            export_count: u16::from_le_bytes([bytes[38], bytes[39]]),
            internal_count: u16::from_le_bytes([bytes[40], bytes[41]]),
            rwdata_count: u16::from_le_bytes([bytes[42], bytes[43]]),
            rodata_count: u16::from_le_bytes([bytes[44], bytes[45]]),
            descriptor_count: u16::from_le_bytes([bytes[46], bytes[47]]),
            _reserved: reserved,
        }
    }

    /// Encode header to 64 bytes.
    pub fn to_bytes(&self) -> [u8; 64] {
        let mut bytes = [0u8; 64];
        bytes[0..4].copy_from_slice(&self.magic);
        bytes[4..8].copy_from_slice(&self.version.to_le_bytes());
        bytes[8..12].copy_from_slice(&self.checksum.to_le_bytes());
        bytes[12..16].copy_from_slice(&self.total_size.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.flags.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.str_blob_size.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.bytecode_size.to_le_bytes());
        bytes[28..32].copy_from_slice(&self.rodata_blob_size.to_le_bytes());
        bytes[32..34].copy_from_slice(&self.str_table_count.to_le_bytes());
        bytes[34..36].copy_from_slice(&self.sig_pool_count.to_le_bytes());
        bytes[36..38].copy_from_slice(&self.import_count.to_le_bytes());
        bytes[38..40].copy_from_slice(&self.export_count.to_le_bytes());
        bytes[40..42].copy_from_slice(&self.internal_count.to_le_bytes());
        bytes[42..44].copy_from_slice(&self.rwdata_count.to_le_bytes());
        bytes[44..46].copy_from_slice(&self.rodata_count.to_le_bytes());
        bytes[46..48].copy_from_slice(&self.descriptor_count.to_le_bytes());
        bytes[48..64].copy_from_slice(&self._reserved);
        bytes
    }

    pub fn validate_magic(&self) -> bool {
        self.magic == MAGIC
    }

    pub fn validate_version(&self) -> bool {
        self.version == VERSION
    }

    pub fn has(&self, flag: u32) -> bool {
        self.flags & flag != 0
    }

    /// Compute section offsets from counts, flags, and blob sizes.
    ///
    /// All sections are 64-byte aligned. An absent optional table contributes
    /// zero bytes and its offset collapses onto the next section's.
    pub fn compute_offsets(&self) -> SectionOffsets {
        let align = SECTION_ALIGN as u32;

        let str_blob = align; // 64
        let str_table = align_up(str_blob + self.str_blob_size, align);
        // count+1 sentinel entries of u32
        let str_table_size = (self.str_table_count as u32 + 1) * 4;

        let sig_pool = align_up(str_table + str_table_size, align);
        let sig_pool_size = self.sig_pool_count as u32 * 4;

        let imports = align_up(sig_pool + sig_pool_size, align);
        let imports_size = self.import_count as u32 * ImportFunctionDef::SIZE as u32;

        let exports = align_up(imports + imports_size, align);
        let exports_size = self.export_count as u32 * ExportFunctionDef::SIZE as u32;

        let internals = align_up(exports + exports_size, align);
        let internals_size = self.internal_count as u32 * InternalFunctionDef::SIZE as u32;

        let module_state = align_up(internals + internals_size, align);
        let module_state_size = if self.has(flags::HAS_MODULE_STATE) {
            ModuleStateDef::SIZE as u32
        } else {
            0
        };

        let rwdata_table = align_up(module_state + module_state_size, align);
        let rwdata_size = self.rwdata_count as u32 * RwdataSegmentDef::SIZE as u32;

        let rodata_table = align_up(rwdata_table + rwdata_size, align);
        let rodata_table_size = self.rodata_count as u32 * RodataSegmentDef::SIZE as u32;

        let descriptors = align_up(rodata_table + rodata_table_size, align);
        let descriptors_size = self.descriptor_count as u32 * FunctionDescriptor::SIZE as u32;

        let bytecode = align_up(descriptors + descriptors_size, align);
        let rodata_blob = align_up(bytecode + self.bytecode_size, align);

        SectionOffsets {
            str_blob,
            str_table,
            sig_pool,
            imports,
            exports,
            internals,
            module_state,
            rwdata_table,
            rodata_table,
            descriptors,
            bytecode,
            rodata_blob,
        }
    }
}

/// Round up to the next multiple of `align`.
pub fn align_up(value: u32, align: u32) -> u32 {
    (value + align - 1) & !(align - 1)
}
