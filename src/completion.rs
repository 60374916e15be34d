pub mod candidate;
pub mod context;
pub mod declarations;
pub mod engine;
pub mod fuzzy;
pub mod outcome;
pub mod parser;
pub mod providers;
pub mod slicer;
pub mod type_resolver;

pub use candidate::{ItemCategory, LookupItem};
pub use context::LookupContext;
pub use engine::LookupDriver;
pub use outcome::{InsertionTemplate, LookupOutcome, LookupResponse};
