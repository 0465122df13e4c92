//! Signature pooling.
//!
//! All signatures share one flat `u32` type-code pool; identical signatures
//! are deduplicated so repeated shapes (common in import-heavy modules) cost
//! one pool slice.

use corvid_bytecode::SigRef;
use indexmap::IndexMap;

#[derive(Default)]
pub struct SigTableBuilder {
    pool: Vec<u32>,
    dedup: IndexMap<(Vec<u32>, Vec<u32>), SigRef>,
}

impl SigTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a signature's argument and result codes, reusing an identical
    /// pool slice when one exists.
    pub fn add(&mut self, args: Vec<u32>, results: Vec<u32>) -> Result<SigRef, String> {
        let key = (args, results);
        if let Some(&sig) = self.dedup.get(&key) {
            return Ok(sig);
        }
        let (args, results) = (&key.0, &key.1);

        let limit = u16::MAX as usize;
        if self.pool.len() + args.len() + results.len() > limit
            || args.len() > limit
            || results.len() > limit
        {
            return Err(format!("signature pool exceeds {limit} codes"));
        }

        let arg_start = self.pool.len() as u16;
        self.pool.extend_from_slice(args);
        let result_start = self.pool.len() as u16;
        self.pool.extend_from_slice(results);

        let sig = SigRef {
            arg_start,
            arg_count: args.len() as u16,
            result_start,
            result_count: results.len() as u16,
        };
        let inserted = self.dedup.insert(key, sig);
        debug_assert!(inserted.is_none());
        Ok(sig)
    }

    /// Total pool length in codes.
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    /// Emit the pool as little-endian bytes.
    pub fn emit(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.pool.len() * 4);
        for code in &self.pool {
            bytes.extend_from_slice(&code.to_le_bytes());
        }
        bytes
    }
}
