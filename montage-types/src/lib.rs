//! # montage-types — addressing and errors for component assemblies
//!
//! This crate holds the plain values every other montage crate speaks in:
//!
//! | Type | What it is |
//! |------|------------|
//! | [`Address`] | Hierarchical path to a component at any composite depth |
//! | [`PortAddress`] | One named port on one addressed component |
//! | [`PortKind`] | Setter, field or provider |
//! | [`PortError`], [`AssemblyError`] | The error taxonomy |
//!
//! Addresses are values: hashable, ordered, cheap to clone. They carry no
//! reference to any model or assembly, so they can be built before either
//! exists and used as map keys afterwards.

#![deny(missing_docs)]

pub mod address;
pub mod error;
pub mod naming;

pub use address::{Address, DELIMITER, PortAddress};
pub use error::{AssemblyError, PortError, PortKind};
pub use naming::short_type_name;

/// Build an [`Address`] from one or more keys.
///
/// Keys can be anything that implements `Display`; integers become their
/// decimal form.
///
/// ```
/// use montage_types::{addr, Address};
///
/// let a = addr!("Array", 2, "youpi");
/// assert_eq!(a.to_string(), "Array_2_youpi");
/// assert_eq!(a, Address::parse("Array_2_youpi"));
/// ```
#[macro_export]
macro_rules! addr {
    ($first:expr $(, $rest:expr)* $(,)?) => {
        $crate::Address::new($first)$(.child($rest))*
    };
}
