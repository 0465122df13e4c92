//! Wire codes for operand and result types.
//!
//! Signatures store one small integer per type so the loader can reconstruct
//! argument/result layouts without any side tables: `1` means a 32-bit
//! scalar word, and every reference-counted object kind has a stable code at
//! a fixed offset from the device-object base. The mapping must stay
//! append-only; reassigning a code breaks every module already serialized.

/// Wire code for a 32-bit scalar word.
pub const TYPE_CODE_I32: u32 = 1;

/// Reference-counted object kinds that can sit behind a ref handle.
///
/// `Opaque` is an externally-defined object with no stable identity across
/// toolchain and runtime, so it deliberately has no wire code: signatures
/// mentioning it cannot be serialized.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefObjectKind {
    Buffer,
    CommandBuffer,
    Device,
    Event,
    Executable,
    Fence,
    Semaphore,
    ConstBuffer,
    Opaque,
}

impl RefObjectKind {
    /// The stable wire code, or `None` for kinds that cannot be serialized.
    pub fn code(self) -> Option<u32> {
        match self {
            Self::Buffer => Some(21),
            Self::CommandBuffer => Some(23),
            Self::Device => Some(24),
            Self::Event => Some(25),
            Self::Executable => Some(26),
            Self::Fence => Some(28),
            Self::Semaphore => Some(29),
            Self::ConstBuffer => Some(62),
            Self::Opaque => None,
        }
    }

    /// Inverse of [`code`](Self::code).
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            21 => Some(Self::Buffer),
            23 => Some(Self::CommandBuffer),
            24 => Some(Self::Device),
            25 => Some(Self::Event),
            26 => Some(Self::Executable),
            28 => Some(Self::Fence),
            29 => Some(Self::Semaphore),
            62 => Some(Self::ConstBuffer),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Buffer => "buffer",
            Self::CommandBuffer => "command_buffer",
            Self::Device => "device",
            Self::Event => "event",
            Self::Executable => "executable",
            Self::Fence => "fence",
            Self::Semaphore => "semaphore",
            Self::ConstBuffer => "const_buffer",
            Self::Opaque => "opaque",
        }
    }
}

/// Render a wire type code for dumps and diagnostics.
pub fn format_type_code(code: u32) -> String {
    if code == TYPE_CODE_I32 {
        return "i32".to_string();
    }
    match RefObjectKind::from_code(code) {
        Some(kind) => format!("ref<{}>", kind.name()),
        None => format!("ref<{code}>"),
    }
}
