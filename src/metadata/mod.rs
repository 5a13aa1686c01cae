//! Declarative test metadata
//!
//! Markers, argument values and the declarations a test module registers.
//! Discovery walks these declarations instead of relying on reflection.

mod decl;
mod marker;
mod value;

pub use decl::{test_fn, MethodDecl, TestFn, TestModule, TypeDecl};
pub use marker::{
    ClassMarker, IgnoreMode, IgnorePolicy, LifecycleRole, MethodMarker, RepeatPolicy,
    RuntimeTarget,
};
pub use value::{bind_args, render_params, BindError, ParamKind, Value};
