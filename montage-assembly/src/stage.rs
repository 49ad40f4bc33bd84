//! Blueprint stages.
//!
//! A [`Model`](crate::Model) moves through three stages, each a distinct
//! type:
//!
//! | Stage | Produced by | Accepts |
//! |-------|-------------|---------|
//! | [`Draft`] | `Model::new` | declarations and meta-operations |
//! | [`Expanded`] | `Model::expand` | nothing; meta-operations have run |
//! | [`Instantiated`] | building an `Assembly` | nothing; read-only record |

mod sealed {
    pub trait Sealed {}
}

/// Marker trait for model stages.
pub trait Stage: sealed::Sealed + 'static {}

/// Mutable blueprint accepting declarations.
#[derive(Debug)]
pub enum Draft {}

/// Blueprint whose meta-operations have been applied.
#[derive(Debug)]
pub enum Expanded {}

/// Blueprint kept by a live assembly.
#[derive(Debug)]
pub enum Instantiated {}

impl sealed::Sealed for Draft {}
impl sealed::Sealed for Expanded {}
impl sealed::Sealed for Instantiated {}

impl Stage for Draft {}
impl Stage for Expanded {}
impl Stage for Instantiated {}
