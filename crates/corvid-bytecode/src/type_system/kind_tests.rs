use super::kind::{RefObjectKind, TYPE_CODE_I32, format_type_code};

const SERIALIZABLE: &[RefObjectKind] = &[
    RefObjectKind::Buffer,
    RefObjectKind::CommandBuffer,
    RefObjectKind::Device,
    RefObjectKind::Event,
    RefObjectKind::Executable,
    RefObjectKind::Fence,
    RefObjectKind::Semaphore,
    RefObjectKind::ConstBuffer,
];

#[test]
fn codes_round_trip() {
    for &kind in SERIALIZABLE {
        let code = kind.code().expect("serializable kind has a code");
        assert_eq!(RefObjectKind::from_code(code), Some(kind));
    }
}

#[test]
fn codes_are_distinct_and_disjoint_from_scalar() {
    let mut seen = std::collections::HashSet::new();
    for &kind in SERIALIZABLE {
        let code = kind.code().unwrap();
        assert_ne!(code, TYPE_CODE_I32);
        assert!(seen.insert(code), "duplicate code {code}");
    }
}

#[test]
fn opaque_has_no_code() {
    assert_eq!(RefObjectKind::Opaque.code(), None);
}

#[test]
fn formats_known_and_unknown_codes() {
    assert_eq!(format_type_code(1), "i32");
    assert_eq!(format_type_code(21), "ref<buffer>");
    assert_eq!(format_type_code(99), "ref<99>");
}
