//! String interning for the container's string table.

use corvid_bytecode::StringId;
use indexmap::IndexMap;

/// Interns strings in first-use order and emits the blob plus the
/// `count+1`-entry offset table. The module name must be interned first so
/// it lands at index 0.
#[derive(Default)]
pub struct StringTableBuilder {
    map: IndexMap<String, u16>,
}

impl StringTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its stable id.
    pub fn intern(&mut self, s: &str) -> Result<StringId, String> {
        if let Some(&id) = self.map.get(s) {
            return Ok(StringId::new(id));
        }
        let id = self.map.len();
        if id > u16::MAX as usize {
            return Err(format!("string table exceeds {} entries", u16::MAX as u32 + 1));
        }
        self.map.insert(s.to_string(), id as u16);
        Ok(StringId::new(id as u16))
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Emit (blob, offset table).
    pub fn emit(&self) -> (Vec<u8>, Vec<u8>) {
        let mut blob = Vec::new();
        let mut table = Vec::with_capacity((self.map.len() + 1) * 4);
        for s in self.map.keys() {
            table.extend_from_slice(&(blob.len() as u32).to_le_bytes());
            blob.extend_from_slice(s.as_bytes());
        }
        table.extend_from_slice(&(blob.len() as u32).to_le_bytes());
        (blob, table)
    }
}
