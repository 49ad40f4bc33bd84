//! The component capability.

use crate::port::Ports;
use montage_types::short_type_name;
use std::any::Any;

/// Something that can live in an assembly and be wired through ports.
///
/// A component declares its ports once, right after construction, in
/// [`declare_ports`](Component::declare_ports). The table is frozen from
/// then on: nothing can add a port to a live instance.
///
/// ```
/// use montage_component::{Component, Ports};
///
/// #[derive(Default)]
/// struct Counter {
///     step: i32,
/// }
///
/// impl Component for Counter {
///     fn declare_ports(&self, ports: &mut Ports<Self>) {
///         ports.field("step", |c: &mut Self| &mut c.step);
///         ports.provider("current", |c: &Self| c.step);
///     }
/// }
/// ```
pub trait Component: Any {
    /// Register this component's ports and interfaces.
    fn declare_ports(&self, ports: &mut Ports<Self>)
    where
        Self: Sized,
    {
        let _ = ports;
    }

    /// Short human-readable description, used by assembly dumps.
    fn debug(&self) -> String {
        short_type_name(std::any::type_name::<Self>())
    }
}
