//! Template host integration
//!
//! The formatting layer is host-agnostic; this module adapts it to helper
//! registries and defines how helper values are written into rendered output.

pub mod escape;
pub mod helpers;
pub mod registry;
pub mod value;

pub use escape::{escape_expression, SafeString};
pub use helpers::{register_with, IntlHelper, IntlHelperKind};
pub use registry::{Helper, HelperRegistry, HelperTable};
pub use value::HelperValue;
