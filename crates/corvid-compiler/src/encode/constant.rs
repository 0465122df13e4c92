//! Rodata payload serialization.

use crate::ir::ConstValue;

use super::EncodeError;

/// Serialize a constant payload into its binary-embeddable form.
///
/// Words are stored little-endian; byte and UTF-8 payloads verbatim. The
/// input is borrowed and never mutated.
pub fn serialize_constant(value: &ConstValue) -> Result<Vec<u8>, EncodeError> {
    let bytes = match value {
        ConstValue::Bytes(bytes) => bytes.clone(),
        ConstValue::Words(words) => {
            let mut bytes = Vec::with_capacity(words.len() * 4);
            for word in words {
                bytes.extend_from_slice(&word.to_le_bytes());
            }
            bytes
        }
        ConstValue::Utf8(text) => text.clone().into_bytes(),
    };
    if bytes.len() > u32::MAX as usize {
        return Err(EncodeError::ConstantTooLarge(bytes.len()));
    }
    Ok(bytes)
}
