//! Scope data and context resolution
//!
//! Helper calls never receive locale data explicitly; they discover it by
//! walking the rendering context chain and merging what each frame carries.

pub mod bundle;
pub mod context;
pub mod resolver;

pub use bundle::{BoundMessage, IntlRef, MessageHandle, MessageNode, ScopeBundle};
pub use context::{ContextStack, Frame, ParentData, INTL_KEY};
pub use resolver::resolve_scope;
