use super::header::{Header, align_up, flags};
use super::{MAGIC, SECTION_ALIGN, VERSION};

#[test]
fn default_header_is_valid() {
    let header = Header::default();
    assert_eq!(header.magic, MAGIC);
    assert_eq!(header.version, VERSION);
    assert!(header.validate_magic());
    assert!(header.validate_version());
}

#[test]
fn round_trips_through_bytes() {
    let header = Header {
        checksum: 0xdead_beef,
        total_size: 4096,
        flags: flags::HAS_IMPORTS | flags::HAS_RODATA,
        str_blob_size: 37,
        bytecode_size: 123,
        rodata_blob_size: 999,
        str_table_count: 5,
        sig_pool_count: 9,
        import_count: 2,
        export_count: 1,
        internal_count: 3,
        rodata_count: 4,
        descriptor_count: 3,
        ..Default::default()
    };
    let decoded = Header::from_bytes(&header.to_bytes());
    assert_eq!(decoded, header);
}

#[test]
fn offsets_are_aligned_and_monotonic() {
    let header = Header {
        flags: flags::HAS_IMPORTS | flags::HAS_MODULE_STATE | flags::HAS_RODATA,
        str_blob_size: 100,
        bytecode_size: 70,
        rodata_blob_size: 10,
        str_table_count: 7,
        sig_pool_count: 12,
        import_count: 3,
        export_count: 2,
        internal_count: 4,
        rodata_count: 1,
        descriptor_count: 4,
        ..Default::default()
    };
    let offsets = header.compute_offsets();
    let order = [
        offsets.str_blob,
        offsets.str_table,
        offsets.sig_pool,
        offsets.imports,
        offsets.exports,
        offsets.internals,
        offsets.module_state,
        offsets.rwdata_table,
        offsets.rodata_table,
        offsets.descriptors,
        offsets.bytecode,
        offsets.rodata_blob,
    ];
    let align = SECTION_ALIGN as u32;
    for pair in order.windows(2) {
        assert!(pair[0] <= pair[1], "offsets must be monotonic: {order:?}");
    }
    for offset in order {
        assert_eq!(offset % align, 0, "offset {offset} not aligned");
    }
    assert_eq!(offsets.str_blob, align);
}

#[test]
fn absent_module_state_takes_no_space() {
    let with = Header {
        flags: flags::HAS_MODULE_STATE,
        ..Default::default()
    };
    let without = Header::default();
    assert!(
        with.compute_offsets().rwdata_table >= without.compute_offsets().rwdata_table
    );
    assert_eq!(
        without.compute_offsets().module_state,
        without.compute_offsets().rwdata_table
    );
}

#[test]
fn align_up_rounds_to_multiples() {
    assert_eq!(align_up(0, 64), 0);
    assert_eq!(align_up(1, 64), 64);
    assert_eq!(align_up(64, 64), 64);
    assert_eq!(align_up(65, 64), 128);
}
