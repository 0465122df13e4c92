//! Module loader with zero-copy table views.
//!
//! A [`Module`] wraps the raw container bytes (owned or memory-mapped) and
//! decodes records lazily. Loading touches only the header and the metadata
//! prefix; the bytecode and rodata blobs stay untouched until asked for.

use std::io;
use std::marker::PhantomData;
use std::ops::Deref;
use std::path::Path;

use memmap2::Mmap;

use super::defs::{
    ExportFunctionDef, FunctionDescriptor, ImportFunctionDef, InternalFunctionDef, ModuleStateDef,
    RodataSegmentDef, SigRef, StringId, TableRecord,
};
use super::header::{Header, SectionOffsets, flags};
use super::VERSION;

/// Storage for container bytes.
#[derive(Debug)]
pub enum ByteStorage {
    Owned(Vec<u8>),
    Mapped(Mmap),
}

impl Deref for ByteStorage {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        match self {
            Self::Owned(bytes) => bytes,
            Self::Mapped(map) => map,
        }
    }
}

impl ByteStorage {
    /// Create from owned bytes.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        Self::Owned(bytes)
    }

    /// Memory-map a file.
    pub fn from_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = std::fs::File::open(path)?;
        // Safety: the map is read-only and the file is not mutated through it.
        let map = unsafe { Mmap::map(&file)? };
        Ok(Self::Mapped(map))
    }
}

/// Module load error.
#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error("invalid magic: expected CVBM")]
    InvalidMagic,
    #[error("unsupported version: {0} (expected {VERSION})")]
    UnsupportedVersion(u32),
    #[error("file too small: {0} bytes (minimum 64)")]
    FileTooSmall(usize),
    #[error("size mismatch: header says {header} bytes, got {actual}")]
    SizeMismatch { header: u32, actual: usize },
    #[error("checksum mismatch: header says {header:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { header: u32, computed: u32 },
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// A loaded bytecode module container.
///
/// Metadata tables are accessed through view methods; optional tables come
/// back as `None` when the header's presence flag is clear.
#[derive(Debug)]
pub struct Module {
    storage: ByteStorage,
    header: Header,
    /// Cached section offsets (computed from header counts).
    offsets: SectionOffsets,
}

impl Module {
    /// Load a module from owned bytes.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, ModuleError> {
        Self::from_storage(ByteStorage::from_vec(bytes))
    }

    /// Load a module from a file path via memory mapping.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ModuleError> {
        let storage = ByteStorage::from_file(&path)?;
        Self::from_storage(storage)
    }

    /// Load a module from storage.
    fn from_storage(storage: ByteStorage) -> Result<Self, ModuleError> {
        if storage.len() < 64 {
            return Err(ModuleError::FileTooSmall(storage.len()));
        }

        let header = Header::from_bytes(&storage[..64]);

        if !header.validate_magic() {
            return Err(ModuleError::InvalidMagic);
        }
        if !header.validate_version() {
            return Err(ModuleError::UnsupportedVersion(header.version));
        }
        if header.total_size as usize != storage.len() {
            return Err(ModuleError::SizeMismatch {
                header: header.total_size,
                actual: storage.len(),
            });
        }
        let computed = crc32fast::hash(&storage[64..]);
        if computed != header.checksum {
            return Err(ModuleError::ChecksumMismatch {
                header: header.checksum,
                computed,
            });
        }

        let offsets = header.compute_offsets();

        Ok(Self {
            storage,
            header,
            offsets,
        })
    }

    /// Get the parsed header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Get the computed section offsets.
    pub fn offsets(&self) -> &SectionOffsets {
        &self.offsets
    }

    /// Get the raw bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.storage
    }

    /// The module name. Always interned as string index 0.
    pub fn name(&self) -> &str {
        self.strings().get_by_index(0)
    }

    /// View into the string table.
    pub fn strings(&self) -> StringsView<'_> {
        let table_offset = self.offsets.str_table as usize;
        let count = self.header.str_table_count as usize;
        StringsView {
            blob: &self.storage[self.offsets.str_blob as usize..],
            table: &self.storage[table_offset..table_offset + (count + 1) * 4],
        }
    }

    /// View into the shared signature code pool.
    pub fn signatures(&self) -> SignaturesView<'_> {
        let offset = self.offsets.sig_pool as usize;
        let count = self.header.sig_pool_count as usize;
        SignaturesView {
            pool: &self.storage[offset..offset + count * 4],
        }
    }

    /// View into the imported-function table, if present.
    pub fn imports(&self) -> Option<TableView<'_, ImportFunctionDef>> {
        self.header
            .has(flags::HAS_IMPORTS)
            .then(|| self.table(self.offsets.imports, self.header.import_count))
    }

    /// View into the exported-function table. Always present, possibly empty.
    pub fn exports(&self) -> TableView<'_, ExportFunctionDef> {
        self.table(self.offsets.exports, self.header.export_count)
    }

    /// View into the internal-function table, absent when symbols were
    /// stripped.
    pub fn internals(&self) -> Option<TableView<'_, InternalFunctionDef>> {
        self.header
            .has(flags::HAS_INTERNAL_NAMES)
            .then(|| self.table(self.offsets.internals, self.header.internal_count))
    }

    /// The module-state reservation, if any globals exist.
    pub fn module_state(&self) -> Option<ModuleStateDef> {
        self.header.has(flags::HAS_MODULE_STATE).then(|| {
            let offset = self.offsets.module_state as usize;
            ModuleStateDef::from_bytes(&self.storage[offset..offset + ModuleStateDef::SIZE])
        })
    }

    /// View into the rodata segments, if any exist.
    pub fn rodata(&self) -> Option<RodataView<'_>> {
        self.header.has(flags::HAS_RODATA).then(|| {
            let table_offset = self.offsets.rodata_table as usize;
            let count = self.header.rodata_count as usize;
            RodataView {
                table: TableView {
                    bytes: &self.storage
                        [table_offset..table_offset + count * RodataSegmentDef::SIZE],
                    count,
                    _marker: PhantomData,
                },
                blob: &self.storage[self.offsets.rodata_blob as usize..],
            }
        })
    }

    /// View into the function descriptor table. Always present.
    pub fn descriptors(&self) -> TableView<'_, FunctionDescriptor> {
        self.table(self.offsets.descriptors, self.header.descriptor_count)
    }

    /// The concatenated bytecode blob.
    pub fn code(&self) -> &[u8] {
        let offset = self.offsets.bytecode as usize;
        &self.storage[offset..offset + self.header.bytecode_size as usize]
    }

    /// The bytecode slice of one function.
    pub fn function_code(&self, descriptor: &FunctionDescriptor) -> &[u8] {
        let start = descriptor.bytecode_offset as usize;
        let end = start + descriptor.bytecode_length as usize;
        &self.code()[start..end]
    }

    fn table<T: TableRecord>(&self, offset: u32, count: u16) -> TableView<'_, T> {
        let offset = offset as usize;
        let count = count as usize;
        TableView {
            bytes: &self.storage[offset..offset + count * T::SIZE],
            count,
            _marker: PhantomData,
        }
    }
}

/// View into the string table for lazy string lookup.
///
/// The table holds `count+1` sequential u32 offsets into the blob; string `i`
/// spans `table[i]..table[i+1]`.
pub struct StringsView<'a> {
    blob: &'a [u8],
    table: &'a [u8],
}

impl<'a> StringsView<'a> {
    /// Get a string by its id.
    pub fn get(&self, id: StringId) -> &'a str {
        self.get_by_index(id.get() as usize)
    }

    /// Get a string by raw index (for iteration and dumps).
    pub fn get_by_index(&self, idx: usize) -> &'a str {
        let start = read_u32_le(self.table, idx * 4) as usize;
        let end = read_u32_le(self.table, (idx + 1) * 4) as usize;
        std::str::from_utf8(&self.blob[start..end]).expect("invalid UTF-8 in string table")
    }
}

/// View into the signature code pool.
pub struct SignaturesView<'a> {
    pool: &'a [u8],
}

impl<'a> SignaturesView<'a> {
    /// Argument type codes of a signature.
    pub fn arg_types(&self, sig: SigRef) -> impl Iterator<Item = u32> + 'a {
        self.codes(sig.arg_start, sig.arg_count)
    }

    /// Result type codes of a signature.
    pub fn result_types(&self, sig: SigRef) -> impl Iterator<Item = u32> + 'a {
        self.codes(sig.result_start, sig.result_count)
    }

    fn codes(&self, start: u16, count: u16) -> impl Iterator<Item = u32> + 'a {
        let pool = self.pool;
        (start as usize..start as usize + count as usize)
            .map(move |i| read_u32_le(pool, i * 4))
    }
}

/// View into a fixed-size record table.
pub struct TableView<'a, T> {
    bytes: &'a [u8],
    count: usize,
    _marker: PhantomData<T>,
}

impl<'a, T: TableRecord> TableView<'a, T> {
    /// Get a record by ordinal.
    pub fn get(&self, idx: usize) -> T {
        assert!(idx < self.count, "table index out of bounds");
        T::from_bytes(&self.bytes[idx * T::SIZE..])
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Iterate over all records in ordinal order.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.count).map(|i| self.get(i))
    }
}

/// View into the rodata segment table and its backing blob.
pub struct RodataView<'a> {
    table: TableView<'a, RodataSegmentDef>,
    blob: &'a [u8],
}

impl<'a> RodataView<'a> {
    /// Get a segment's payload bytes by ordinal.
    pub fn get(&self, idx: usize) -> &'a [u8] {
        let def = self.table.get(idx);
        &self.blob[def.offset as usize..(def.offset + def.length) as usize]
    }

    /// Number of segments.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
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
