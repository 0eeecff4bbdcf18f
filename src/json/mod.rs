//! JSON parsing helpers with rich diagnostics

pub mod diagnostics;

pub use diagnostics::JsonSyntaxError;
