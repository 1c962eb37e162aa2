// src/sema/mod.rs
pub mod analyze_info;
pub mod analyzer;
pub mod capture;
pub mod compatibility;
pub mod diagnostics;
pub mod metadata;
pub mod module_builder;
pub mod module_info;
pub mod scope;
pub mod skeleton;
pub mod type_env;
pub mod type_expr;
pub mod types;
pub mod well_known;

pub use analyze_info::{
    AnalyzeInfo, AssignTarget, Callee, CaptureInfo, CapturedVar, FuncTemplate, NodeInfo, OperandKind,
    StorageInfo, VarDeclElemInfo,
};
pub use analyzer::{AnalyzeError, Analyzer, AnalyzerBuilder};
pub use capture::{CaptureAnalyzer, CaptureKind, CaptureResult};
pub use compatibility::is_assignable;
pub use diagnostics::{Diagnostics, TypeError};
pub use metadata::MetadataService;
pub use module_info::{EnumElemInfo, FuncInfo, ModuleInfo, TypeInfo, TypeKind, VarInfo};
pub use type_env::{TypeEnv, apply_type_env, make_type_env};
pub use types::{FuncValue, NormalTypeValue, TypeArgumentList, TypeValue, VarValue};
pub use well_known::{WellKnownTypes, runtime_module};
