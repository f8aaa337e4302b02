//! FFI facade for the study notebooks.
pub mod python;
