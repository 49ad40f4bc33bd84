//! Declarative models and the instantiation engine for montage.
//!
//! Building a system is two phases:
//!
//! 1. **Declare** a [`Model`]: components by address, composites, and
//!    operations (connector invocations) that say how ports are wired.
//!    Nothing is constructed yet.
//! 2. **Instantiate** an [`Assembly`] from it: every component is built,
//!    then every recorded operation is replayed against the live tree.
//!
//! Meta-operations ([`MetaConnector`], [`MetaComponent`]) rewrite the draft
//! model itself and run once, in [`Model::expand`], before the structural
//! build. The blueprint's stage is part of its type ([`Draft`],
//! [`Expanded`], [`Instantiated`]).
//!
//! ```
//! use montage_assembly::{Array, Assembly, Model, MultiUse};
//! use montage_component::test_utils::{IntBox, IntProvider, IntReducer};
//! use montage_types::{addr, PortAddress, PortError};
//!
//! let mut model = Model::new();
//! model.composite_with("inputs", Array::new(3, || IntBox::new(12)));
//! model.component("sum", IntReducer::new);
//! model.connect::<MultiUse<dyn IntProvider>>((PortAddress::new("ptr", "sum"), "inputs".into()));
//!
//! let assembly = Assembly::new(&model).unwrap();
//! assembly.at_mut::<IntBox>(&addr!("inputs", 1)).unwrap().value = 23;
//! let sum = assembly.get::<Result<i32, PortError>>(&PortAddress::new("sum", "sum")).unwrap();
//! assert_eq!(sum.unwrap(), 47);
//! ```

#![deny(missing_docs)]

mod assembly;
mod config;
mod connector;
mod graph;
mod meta;
mod model;
mod operation;
mod stage;

pub use assembly::{Assembly, Instance};
pub use config::AssemblyConfig;
pub use connector::{
    Array, ArrayOneToOne, ArraySet, Connector, ListUse, MultiProvide, MultiUse, Provide, Set,
    Use, UseProvide,
};
pub use graph::{Digraph, Dot};
pub use meta::{Condition, Conditional, MetaComponent, MetaConnector};
pub use model::{ComponentRef, Contents, Model};
pub use operation::{Endpoint, Operation};
pub use stage::{Draft, Expanded, Instantiated, Stage};
