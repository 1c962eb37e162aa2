// src/lib.rs
pub mod errors;
pub mod frontend;
pub mod identity;
pub mod sema;

pub use sema::{AnalyzeError, AnalyzeInfo, Analyzer, AnalyzerBuilder};
