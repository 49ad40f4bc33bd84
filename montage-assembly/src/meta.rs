//! Meta-operations: blueprint rewrites run once, at expansion.
//!
//! A meta-operation receives the draft model it was declared on and may
//! declare components, composites, connections and further meta-operations.
//! It runs exactly once, during [`Model::expand`], and is consumed.

use crate::model::Model;
use crate::stage::Draft;
use montage_component::Component;
use montage_types::{Address, AssemblyError, short_type_name};
use std::rc::Rc;

type Apply = Rc<dyn Fn(&mut Model<Draft>) -> Result<(), AssemblyError>>;

/// A recorded meta-operation waiting for expansion.
#[derive(Clone)]
pub(crate) struct MetaOperation {
    name: String,
    apply: Apply,
}

impl MetaOperation {
    pub(crate) fn connector<M: MetaConnector>(args: M::Args) -> Self {
        let args = Rc::new(args);
        Self {
            name: M::name(),
            apply: Rc::new(move |model: &mut Model<Draft>| M::connect(model, &args)),
        }
    }

    pub(crate) fn component<M: MetaComponent>(address: Address, args: M::Args) -> Self {
        let args = Rc::new(args);
        Self {
            name: M::name(),
            apply: Rc::new(move |model: &mut Model<Draft>| M::declare(model, &address, &args)),
        }
    }

    pub(crate) fn apply(&self, model: &mut Model<Draft>) -> Result<(), AssemblyError> {
        tracing::trace!(meta = %self.name, "applying meta-operation");
        (self.apply)(model).inspect_err(|err| {
            tracing::debug!(meta = %self.name, error = %err, "meta-operation failed");
        })
    }
}

/// Programmatic wiring generated at expansion time.
pub trait MetaConnector: 'static {
    /// Arguments recorded by `Model::meta_connect`.
    type Args: 'static;

    /// Rewrite `model`.
    fn connect(model: &mut Model<Draft>, args: &Self::Args) -> Result<(), AssemblyError>;

    /// Name used in logs.
    fn name() -> String {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Declares whatever belongs at one address, decided at expansion time.
pub trait MetaComponent: 'static {
    /// Arguments recorded by `Model::meta_component`.
    type Args: 'static;

    /// Declare content at `address` of `model`. `address` is relative to
    /// the model the meta-component was declared on.
    fn declare(
        model: &mut Model<Draft>,
        address: &Address,
        args: &Self::Args,
    ) -> Result<(), AssemblyError>;

    /// Name used in logs.
    fn name() -> String {
        short_type_name(std::any::type_name::<Self>())
    }
}

/// Registers a component only when a predicate over its address holds.
///
/// This is the hook for placement schemes where only part of a blueprint is
/// materialised in a given process: an address rejected by the predicate
/// produces no instance, and later wiring can check for it with
/// `exists`.
///
/// ```
/// use montage_assembly::{Assembly, Condition, Conditional, Model};
/// use montage_component::test_utils::IntBox;
///
/// let mut model = Model::new();
/// for i in 0..4 {
///     let keep = Condition::new(|a| a.last().parse::<u32>().is_ok_and(|i| i % 2 == 0), || IntBox::new(1));
///     model.meta_component::<Conditional<IntBox>>(i, keep);
/// }
/// let assembly = Assembly::new(&model).unwrap();
/// assert_eq!(assembly.keys(), ["0", "2"]);
/// ```
pub struct Conditional<C>(std::marker::PhantomData<C>);

/// Arguments of [`Conditional`].
pub struct Condition<C> {
    predicate: Rc<dyn Fn(&Address) -> bool>,
    build: Rc<dyn Fn() -> C>,
}

impl<C: Component> Condition<C> {
    /// Build with `build` wherever `predicate` accepts the address.
    pub fn new(
        predicate: impl Fn(&Address) -> bool + 'static,
        build: impl Fn() -> C + 'static,
    ) -> Self {
        Self {
            predicate: Rc::new(predicate),
            build: Rc::new(build),
        }
    }

    /// True if a component belongs at `address`.
    pub fn holds(&self, address: &Address) -> bool {
        (self.predicate)(address)
    }
}

impl<C: Component> MetaComponent for Conditional<C> {
    type Args = Condition<C>;

    fn declare(
        model: &mut Model<Draft>,
        address: &Address,
        args: &Self::Args,
    ) -> Result<(), AssemblyError> {
        if !args.holds(address) {
            tracing::debug!(address = %address, "condition rejected component");
            return Ok(());
        }
        let build = Rc::clone(&args.build);
        model.component(address.clone(), move || build());
        Ok(())
    }
}
