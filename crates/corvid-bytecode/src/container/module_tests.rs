use std::io::Write as _;

use super::header::Header;
use super::module::{Module, ModuleError};
use super::SECTION_ALIGN;

/// Hand-assemble the smallest valid container: one string (the module name),
/// no symbols, no code.
fn minimal_container(name: &str) -> Vec<u8> {
    let mut out = vec![0u8; 64];

    // str blob
    pad(&mut out);
    out.extend_from_slice(name.as_bytes());

    // str table: count+1 sentinel offsets
    pad(&mut out);
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&(name.len() as u32).to_le_bytes());

    pad(&mut out);
    let total_size = out.len() as u32;

    let mut header = Header {
        total_size,
        str_blob_size: name.len() as u32,
        str_table_count: 1,
        ..Default::default()
    };
    header.checksum = crc32fast::hash(&out[64..]);
    out[..64].copy_from_slice(&header.to_bytes());
    out
}

fn pad(buf: &mut Vec<u8>) {
    let rem = buf.len() % SECTION_ALIGN;
    if rem != 0 {
        buf.resize(buf.len() + SECTION_ALIGN - rem, 0);
    }
}

#[test]
fn loads_minimal_container() {
    let module = Module::from_bytes(minimal_container("demo")).unwrap();
    assert_eq!(module.name(), "demo");
    assert!(module.imports().is_none());
    assert!(module.internals().is_none());
    assert!(module.module_state().is_none());
    assert!(module.rodata().is_none());
    assert!(module.exports().is_empty());
    assert!(module.descriptors().is_empty());
    assert!(module.code().is_empty());
}

#[test]
fn rejects_short_file() {
    let err = Module::from_bytes(vec![0u8; 10]).unwrap_err();
    assert!(matches!(err, ModuleError::FileTooSmall(10)));
}

#[test]
fn rejects_bad_magic() {
    let mut bytes = minimal_container("demo");
    bytes[0] = b'X';
    let err = Module::from_bytes(bytes).unwrap_err();
    assert!(matches!(err, ModuleError::InvalidMagic));
}

#[test]
fn rejects_bad_version() {
    let mut bytes = minimal_container("demo");
    bytes[4] = 0xFF;
    let err = Module::from_bytes(bytes).unwrap_err();
    assert!(matches!(err, ModuleError::UnsupportedVersion(_)));
}

#[test]
fn rejects_size_mismatch() {
    let mut bytes = minimal_container("demo");
    bytes.extend_from_slice(&[0u8; 64]);
    let err = Module::from_bytes(bytes).unwrap_err();
    assert!(matches!(err, ModuleError::SizeMismatch { .. }));
}

#[test]
fn rejects_corrupted_payload() {
    let mut bytes = minimal_container("demo");
    // Flip a bit past the header; the checksum must catch it.
    let last = bytes.len() - 1;
    bytes[last] ^= 0x01;
    let err = Module::from_bytes(bytes).unwrap_err();
    assert!(matches!(err, ModuleError::ChecksumMismatch { .. }));
}

#[test]
fn loads_from_mapped_file() {
    let bytes = minimal_container("mapped");
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&bytes).unwrap();
    file.flush().unwrap();

    let module = Module::from_path(file.path()).unwrap();
    assert_eq!(module.name(), "mapped");
}
