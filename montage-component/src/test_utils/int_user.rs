//! IntUser — reads a single provider.

use super::IntProvider;
use crate::{Component, Handle, Ports};
use montage_types::PortError;

/// Uses exactly one provider, replaced on every connection.
///
/// Ports: `ptr` (setter, `Handle<dyn IntProvider>`), `value` (setter, `i32`,
/// a plain copy of some provided value).
#[derive(Debug, Default)]
pub struct IntUser {
    target: Option<Handle<dyn IntProvider>>,
    copied: Option<i32>,
}

impl IntUser {
    /// Create an unconnected user.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read through the connected provider, `None` if unconnected.
    pub fn read(&self) -> Option<Result<i32, PortError>> {
        self.target
            .as_ref()
            .map(|t| t.with(|p| p.get()).and_then(|value| value))
    }

    /// Qualified name of the connected provider.
    pub fn target(&self) -> Option<&str> {
        self.target.as_ref().map(|t| t.name())
    }

    /// Last value received on the `value` port.
    pub fn copied(&self) -> Option<i32> {
        self.copied
    }
}

impl Component for IntUser {
    fn declare_ports(&self, ports: &mut Ports<Self>) {
        ports
            .setter("ptr", |u: &mut Self, target: Handle<dyn IntProvider>| {
                u.target = Some(target)
            })
            .setter("value", |u: &mut Self, value: i32| u.copied = Some(value));
    }

    fn debug(&self) -> String {
        match &self.target {
            Some(t) => format!("IntUser(-> {})", t.name()),
            None => "IntUser(unconnected)".to_owned(),
        }
    }
}
