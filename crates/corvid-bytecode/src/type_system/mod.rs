//! Type-kind codes shared between the compiler and the runtime loader.

mod kind;

#[cfg(test)]
mod kind_tests;

pub use kind::{RefObjectKind, TYPE_CODE_I32, format_type_code};
