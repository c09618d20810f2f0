//! Multilingual content resolution.
//!
//! The pipeline turns raw CMS subsections into page view models:
//!
//! ```text
//! SubSection[] ──aggregate──▶ map_fields (per subsection × repetition)
//!                                 └──▶ resolve (per named element)
//!              ◀── ViewModel[] sorted by order
//! ```
//!
//! - [`resolver`] - best string for one element in one language
//! - [`mapping`] - declarative output-key → rule mapping for one subsection
//! - [`aggregate`] - all subsections of a section into an ordered list
//! - [`language`] - language selection and writing direction
//!
//! Every function here is synchronous and pure. The language is always an
//! explicit argument; nothing is read from ambient state.

pub mod aggregate;
pub mod language;
pub mod mapping;
pub mod resolver;

pub use aggregate::{ItemFilter, ViewModel, aggregate};
pub use language::{TextDirection, select_language};
pub use mapping::{DeriveFn, FieldMapping, FieldRule, FieldValue, MappedFields, map_fields};
pub use resolver::resolve;
