//! Recorded connector invocations.

use crate::assembly::Assembly;
use crate::connector::Connector;
use montage_types::{Address, AssemblyError, PortAddress};
use serde::Serialize;
use std::fmt;
use std::rc::Rc;

/// One end of a connection, as recorded for introspection.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Endpoint {
    /// A named port on a component (the "user" side).
    Port(PortAddress),
    /// A component or composite as a whole (the "provider" side).
    Address(Address),
}

impl Endpoint {
    /// The component or composite this endpoint touches.
    pub fn address(&self) -> &Address {
        match self {
            Self::Port(port) => &port.address,
            Self::Address(address) => address,
        }
    }

    /// Port name, if this endpoint is a port.
    pub fn port(&self) -> Option<&str> {
        match self {
            Self::Port(port) => Some(&port.port),
            Self::Address(_) => None,
        }
    }

    /// The same endpoint with `prefix` prepended to its address.
    pub fn prefixed(&self, prefix: &Address) -> Endpoint {
        match self {
            Self::Port(port) => Self::Port(PortAddress {
                port: port.port.clone(),
                address: prefix.join(&port.address),
            }),
            Self::Address(address) => Self::Address(prefix.join(address)),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Port(port) => write!(f, "{port}"),
            Self::Address(address) => write!(f, "{address}"),
        }
    }
}

type Replay = Rc<dyn Fn(&Assembly) -> Result<(), AssemblyError>>;

/// A connector together with its bound arguments.
///
/// Operations are recorded by `Model::connect` and replayed, in declaration
/// order, once every instance of their level exists. The endpoint list lets
/// them be rendered without running.
#[derive(Clone)]
pub struct Operation {
    connector: String,
    endpoints: Vec<Endpoint>,
    replay: Replay,
}

impl Operation {
    pub(crate) fn new<C: Connector>(args: C::Args) -> Self {
        let endpoints = C::endpoints(&args);
        let args = Rc::new(args);
        Self {
            connector: C::name(),
            endpoints,
            replay: Rc::new(move |assembly: &Assembly| C::connect(assembly, &args)),
        }
    }

    /// Short type name of the connector, e.g. `Use<dyn IntProvider>`.
    pub fn connector(&self) -> &str {
        &self.connector
    }

    /// Recorded endpoints, in argument order.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// The `(user port, provider)` pair if this operation is a dependency
    /// edge: exactly two endpoints, a port followed by a plain address.
    pub fn dependency(&self) -> Option<(&PortAddress, &Address)> {
        match self.endpoints.as_slice() {
            [Endpoint::Port(user), Endpoint::Address(provider)] => Some((user, provider)),
            _ => None,
        }
    }

    pub(crate) fn replay(&self, assembly: &Assembly) -> Result<(), AssemblyError> {
        (self.replay)(assembly)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.connector)?;
        for (i, endpoint) in self.endpoints.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{endpoint}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("connector", &self.connector)
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}
