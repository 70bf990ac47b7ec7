//! Test helpers module
//!
//! Shared setup for the integration tests: environment init, frame and
//! option builders, locale data fixtures and a recording formatter factory.

pub mod recording_factory;
pub mod test_data;
pub mod test_env;

pub use recording_factory::*;
pub use test_data::*;
pub use test_env::*;
