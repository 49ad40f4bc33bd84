//! Component capability and type-checked port registry for montage.
//!
//! A [`Component`] declares named ports once, right after construction. A
//! [`Leaf`] owns the constructed instance together with that frozen table
//! and dispatches calls by name, checking every call's argument type against
//! the declared signature. References between components are [`Handle`]s:
//! weak, typed by interface, and dangling-safe.

#![deny(missing_docs)]

mod component;
mod handle;
mod leaf;
mod port;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use component::Component;
pub use handle::Handle;
pub use leaf::Leaf;
pub use port::{PortInfo, Ports, Signature};
