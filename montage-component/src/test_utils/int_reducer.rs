//! IntReducer — sums every provider it is connected to.

use super::IntProvider;
use crate::{Component, Handle, Ports};
use montage_types::PortError;
use std::cell::RefCell;
use std::rc::Rc;

/// Sums the values of all connected providers.
///
/// Ports: `ptr` (setter, `Handle<dyn IntProvider>`, appends),
/// `sum` (provider, `Result<i32, PortError>`).
/// Interfaces: [`IntProvider`] (the sum).
#[derive(Debug, Default)]
pub struct IntReducer {
    inputs: Vec<Handle<dyn IntProvider>>,
}

impl IntReducer {
    /// Create a reducer with no inputs.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum of all inputs, failing if any input is gone or busy.
    pub fn sum(&self) -> Result<i32, PortError> {
        self.inputs
            .iter()
            .map(|input| input.with(|p| p.get()).and_then(|value| value))
            .sum()
    }

    /// Qualified names of the connected inputs, in connection order.
    pub fn inputs(&self) -> Vec<String> {
        self.inputs.iter().map(|h| h.name().to_owned()).collect()
    }
}

impl IntProvider for IntReducer {
    fn get(&self) -> Result<i32, PortError> {
        self.sum()
    }
}

impl Component for IntReducer {
    fn declare_ports(&self, ports: &mut Ports<Self>) {
        ports
            .setter("ptr", |r: &mut Self, input: Handle<dyn IntProvider>| {
                r.inputs.push(input)
            })
            .provider("sum", |r: &Self| r.sum())
            .interface::<dyn IntProvider>(|c| c as Rc<RefCell<dyn IntProvider>>);
    }

    fn debug(&self) -> String {
        format!("IntReducer({} inputs)", self.inputs.len())
    }
}
