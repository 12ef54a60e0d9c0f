//! Foundation types for the resolver.
//!
//! - [`FileId`] - compilation-unit identity
//! - [`TextRange`], [`TextSize`], [`LineIndex`] - source positions
//! - [`Name`], [`Interner`] - identifier interning
//! - [`FqName`] - dotted fully-qualified names
//!
//! This module has NO dependencies on other crate modules.

mod file_id;
mod fq_name;
mod intern;
mod span;

pub use file_id::FileId;
pub use fq_name::FqName;
pub use intern::{Interner, Name, is_identifier};
pub use span::{LineCol, LineIndex, TextRange, TextSize};
