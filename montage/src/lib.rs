#![deny(missing_docs)]
//! # montage — umbrella crate
//!
//! One import surface for the montage component-assembly runtime. The layer
//! crates are re-exported behind feature flags, plus a `prelude` with the
//! types a typical blueprint touches.
//!
//! ```
//! use montage::prelude::*;
//!
//! #[derive(Default)]
//! struct Greeter {
//!     name: String,
//! }
//!
//! impl Component for Greeter {
//!     fn declare_ports(&self, ports: &mut Ports<Self>) {
//!         ports.field("name", |g: &mut Self| &mut g.name);
//!     }
//! }
//!
//! let mut model = Model::new();
//! model.component("hello", Greeter::default).set("name", "world".to_owned());
//! let assembly = Assembly::new(&model).unwrap();
//! assert_eq!(assembly.at::<Greeter>(&addr!("hello")).unwrap().name, "world");
//! ```

#[cfg(feature = "core")]
pub use montage_assembly;
#[cfg(feature = "core")]
pub use montage_component;
#[cfg(feature = "core")]
pub use montage_types;

#[cfg(feature = "core")]
pub use montage_types::addr;

/// Happy-path imports for declaring and building assemblies.
pub mod prelude {
    #[cfg(feature = "core")]
    pub use montage_types::{Address, AssemblyError, PortAddress, PortError, addr};

    #[cfg(feature = "core")]
    pub use montage_component::{Component, Handle, Ports};

    #[cfg(feature = "core")]
    pub use montage_assembly::{
        Array, ArrayOneToOne, Assembly, AssemblyConfig, Connector, ListUse, Model, MultiProvide,
        MultiUse, Provide, Set, Use,
    };
}
