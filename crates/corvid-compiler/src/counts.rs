//! Module symbol counting.
//!
//! Counts are taken in one linear scan and, per category, must equal
//! `max(ordinal) + 1`. The builder verifies this before using ordinals as
//! array indices; a mismatch means ordinal assignment upstream is broken.

use crate::ir::{Decl, Module};

/// Per-category symbol counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SymbolCounts {
    pub import_funcs: usize,
    pub export_funcs: usize,
    pub internal_funcs: usize,
    pub global_words: usize,
    pub global_refs: usize,
    pub rodata_segments: usize,
}

/// Count symbols per category with a single scan of the declarations.
pub fn count_symbols(module: &Module) -> SymbolCounts {
    let mut counts = SymbolCounts::default();
    for decl in &module.decls {
        match decl {
            Decl::Import(_) => counts.import_funcs += 1,
            Decl::Func(_) => counts.internal_funcs += 1,
            Decl::Export(_) => counts.export_funcs += 1,
            Decl::GlobalWord(_) => counts.global_words += 1,
            Decl::GlobalRef(_) => counts.global_refs += 1,
            Decl::Rodata(_) => counts.rodata_segments += 1,
        }
    }
    counts
}

impl SymbolCounts {
    /// Verify that every category's ordinals form exactly `{0..count}`.
    ///
    /// Returns a description of the first violation found.
    pub fn verify(&self, module: &Module) -> Result<(), String> {
        let mut import = OrdinalSet::new("import function", self.import_funcs);
        let mut export = OrdinalSet::new("export", self.export_funcs);
        let mut internal = OrdinalSet::new("internal function", self.internal_funcs);
        let mut global_word = OrdinalSet::new("global word", self.global_words);
        let mut global_ref = OrdinalSet::new("global ref", self.global_refs);
        let mut rodata = OrdinalSet::new("rodata segment", self.rodata_segments);

        for decl in &module.decls {
            let (set, ordinal) = match decl {
                Decl::Import(d) => (&mut import, d.ordinal),
                Decl::Func(d) => (&mut internal, d.ordinal),
                Decl::Export(d) => (&mut export, d.ordinal),
                Decl::GlobalWord(d) => (&mut global_word, d.ordinal),
                Decl::GlobalRef(d) => (&mut global_ref, d.ordinal),
                Decl::Rodata(d) => (&mut rodata, d.ordinal),
            };
            set.record(decl.name(), ordinal)?;
        }
        Ok(())
    }
}

/// Tracks which ordinals of one category have been seen.
struct OrdinalSet {
    category: &'static str,
    seen: Vec<bool>,
}

impl OrdinalSet {
    fn new(category: &'static str, count: usize) -> Self {
        Self {
            category,
            seen: vec![false; count],
        }
    }

    fn record(&mut self, symbol: &str, ordinal: Option<u32>) -> Result<(), String> {
        let Some(ordinal) = ordinal else {
            return Err(format!(
                "{} '{symbol}' has no assigned ordinal",
                self.category
            ));
        };
        let idx = ordinal as usize;
        if idx >= self.seen.len() {
            return Err(format!(
                "{} '{symbol}' has ordinal {ordinal}, outside [0, {})",
                self.category,
                self.seen.len()
            ));
        }
        if self.seen[idx] {
            return Err(format!(
                "{} '{symbol}' reuses ordinal {ordinal}",
                self.category
            ));
        }
        self.seen[idx] = true;
        Ok(())
    }
}
