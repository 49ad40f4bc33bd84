//! IntBox — holds one integer.

use super::IntProvider;
use crate::{Component, Ports};
use montage_types::PortError;
use std::cell::RefCell;
use std::rc::Rc;

/// Holds a single integer.
///
/// Ports: `value` (field, `i32`), `get` (provider, `i32`).
/// Interfaces: [`IntProvider`].
#[derive(Debug, Default)]
pub struct IntBox {
    /// Stored value.
    pub value: i32,
}

impl IntBox {
    /// Create a box holding `value`.
    pub fn new(value: i32) -> Self {
        Self { value }
    }
}

impl IntProvider for IntBox {
    fn get(&self) -> Result<i32, PortError> {
        Ok(self.value)
    }
}

impl Component for IntBox {
    fn declare_ports(&self, ports: &mut Ports<Self>) {
        ports
            .field("value", |b: &mut Self| &mut b.value)
            .provider("get", |b: &Self| b.value)
            .interface::<dyn IntProvider>(|c| c as Rc<RefCell<dyn IntProvider>>);
    }

    fn debug(&self) -> String {
        format!("IntBox({})", self.value)
    }
}
