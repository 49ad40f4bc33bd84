//! Error types for ports and assemblies.
//!
//! Every error is fatal for the call that produced it: nothing in montage
//! retries or recovers. `Display` gives the long message; `code()` gives a
//! short, stable one.

use crate::address::{Address, PortAddress};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// What a port does when it is called.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortKind {
    /// Calls a setter with the given arguments.
    Setter,
    /// Writes the argument into a data member.
    Field,
    /// Returns a value on request.
    Provider,
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Setter => "setter",
            Self::Field => "field",
            Self::Provider => "provider",
        })
    }
}

/// Errors raised by a single component's port table or by a handle.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum PortError {
    /// No port with this name was declared.
    #[error("port `{port}` not found on component `{component}`")]
    NotFound {
        /// Qualified name of the component.
        component: String,
        /// Requested port name.
        port: String,
    },

    /// The port exists but was declared with a different argument type.
    #[error(
        "port `{port}` on component `{component}` has signature `{expected}`, called with `{found}`"
    )]
    TypeMismatch {
        /// Qualified name of the component.
        component: String,
        /// Port name.
        port: String,
        /// Declared signature.
        expected: String,
        /// Signature of the attempted call.
        found: String,
    },

    /// The port exists but cannot be used this way (e.g. `get` on a setter).
    #[error("port `{port}` on component `{component}` is a {actual} port, expected a {expected} port")]
    KindMismatch {
        /// Qualified name of the component.
        component: String,
        /// Port name.
        port: String,
        /// Kind the call needed.
        expected: PortKind,
        /// Kind the port was declared with.
        actual: PortKind,
    },

    /// The component cannot be referenced as the requested interface.
    #[error("component `{component}` does not provide interface `{interface}`")]
    InterfaceNotProvided {
        /// Qualified name of the component.
        component: String,
        /// Requested interface type.
        interface: String,
    },

    /// The component is already borrowed in a conflicting way.
    #[error("component `{component}` is already borrowed")]
    Busy {
        /// Qualified name of the component.
        component: String,
    },

    /// The component behind a handle was dropped with its assembly.
    #[error("component `{component}` no longer exists; its assembly was dropped")]
    Dangling {
        /// Qualified name of the component.
        component: String,
    },
}

impl PortError {
    /// Short, stable description of the error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "PORT_NOT_FOUND",
            Self::TypeMismatch { .. } => "PORT_TYPE_MISMATCH",
            Self::KindMismatch { .. } => "PORT_KIND_MISMATCH",
            Self::InterfaceNotProvided { .. } => "INTERFACE_NOT_PROVIDED",
            Self::Busy { .. } => "COMPONENT_BUSY",
            Self::Dangling { .. } => "DANGLING_HANDLE",
        }
    }
}

/// Errors raised while declaring, expanding, instantiating or querying an
/// assembly.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// A key of the address is absent at some nesting level.
    #[error(
        "address `{address}` not found: no key `{key}` at this level (known keys: {known_keys})",
        known_keys = .known.join(", ")
    )]
    AddressNotFound {
        /// Full address being resolved.
        address: Address,
        /// Key that was missing.
        key: String,
        /// Keys present at the level where resolution stopped.
        known: Vec<String>,
    },

    /// The address names something that is not a composite.
    #[error("`{address}` is not a composite")]
    CompositeNotFound {
        /// Offending address.
        address: Address,
    },

    /// Two arrays that must be the same size are not.
    #[error(
        "array size mismatch: `{left}` has {left_size} elements, `{right}` has {right_size}"
    )]
    ArraySizeMismatch {
        /// First array.
        left: Address,
        /// Size of the first array.
        left_size: usize,
        /// Second array (or value list).
        right: Address,
        /// Size of the second array.
        right_size: usize,
    },

    /// A multi-target connector could not resolve one of its targets.
    #[error("connector `{connector}` failed to resolve its targets: {source}")]
    ConnectorResolution {
        /// Short name of the connector.
        connector: String,
        /// What went wrong.
        #[source]
        source: Box<AssemblyError>,
    },

    /// The instance at an address is not of the requested type.
    #[error("instance at `{address}` is `{found}`, not `{expected}`")]
    TypeMismatch {
        /// Address that was looked up.
        address: Address,
        /// Requested type.
        expected: String,
        /// Actual type.
        found: String,
    },

    /// No annotation with this key was attached to the address.
    #[error("no annotation `{key}` on `{address}`")]
    AnnotationNotFound {
        /// Annotated address.
        address: Address,
        /// Missing key.
        key: String,
    },

    /// A port call failed.
    #[error("port `{port}`: {source}")]
    Port {
        /// Port being called.
        port: PortAddress,
        /// Port-level error.
        #[source]
        source: PortError,
    },

    /// Component access outside a port call failed (borrow, dangling handle).
    #[error("{0}")]
    Component(#[from] PortError),

    /// Catch-all for meta-operations and user connectors.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl AssemblyError {
    /// Short, stable description of the error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::AddressNotFound { .. } => "ADDRESS_NOT_FOUND",
            Self::CompositeNotFound { .. } => "COMPOSITE_NOT_FOUND",
            Self::ArraySizeMismatch { .. } => "ARRAY_SIZE_MISMATCH",
            Self::ConnectorResolution { .. } => "CONNECTOR_RESOLUTION_FAILURE",
            Self::TypeMismatch { .. } => "TYPE_MISMATCH",
            Self::AnnotationNotFound { .. } => "ANNOTATION_NOT_FOUND",
            Self::Port { source, .. } | Self::Component(source) => source.code(),
            Self::Other(_) => "OTHER",
        }
    }

    /// The innermost error, looking through connector wrapping.
    pub fn root_cause(&self) -> &AssemblyError {
        match self {
            Self::ConnectorResolution { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
