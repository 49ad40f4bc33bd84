//! The connector protocol.
//!
//! A connector is a stateless strategy encoding one wiring pattern. It is
//! named as the type argument of `Model::connect`, which records its
//! arguments; the assembly replays it once every instance of the level
//! exists.
//!
//! | Connector | Arguments | Effect |
//! |-----------|-----------|--------|
//! | [`Use<I>`] | user port, provider | user port receives `Handle<I>` to the provider |
//! | [`Provide<P>`] | user port, provider port | user port receives the provided value |
//! | [`Set<V>`] | port, value | port receives the value |
//! | [`MultiUse<I>`] | user port, array | user port receives one handle per element |
//! | [`MultiProvide<I>`] | array, port, provider | every element's port receives the provider |
//! | [`ArrayOneToOne<I>`] | array, port, array | element `i` uses element `i` |
//! | [`ListUse<I>`] | user port, provider list | one handle per listed provider |
//! | [`ArraySet<V>`] | array, port, values | element `i` receives value `i` |
//!
//! [`Array<C>`] is not a connector but a composite generator, used with
//! `Model::composite_with`.

use crate::assembly::Assembly;
use crate::model::{Contents, Model};
use crate::operation::Endpoint;
use crate::stage::Draft;
use montage_component::Component;
use montage_types::{Address, AssemblyError, PortAddress, short_type_name};
use std::marker::PhantomData;
use std::rc::Rc;

/// A wiring strategy replayed against a live assembly.
pub trait Connector: 'static {
    /// Arguments recorded by `Model::connect`.
    type Args: 'static;

    /// Perform the wiring.
    fn connect(assembly: &Assembly, args: &Self::Args) -> Result<(), AssemblyError>;

    /// Endpoints touched by this invocation, for introspection.
    fn endpoints(args: &Self::Args) -> Vec<Endpoint> {
        let _ = args;
        Vec::new()
    }

    /// Name used in dumps and error messages.
    fn name() -> String {
        short_type_name(std::any::type_name::<Self>())
    }
}

fn resolving<C: Connector, T>(result: Result<T, AssemblyError>) -> Result<T, AssemblyError> {
    result.map_err(|source| AssemblyError::ConnectorResolution {
        connector: C::name(),
        source: Box::new(source),
    })
}

fn array_size(assembly: &Assembly, array: &Address) -> Result<usize, AssemblyError> {
    Ok(assembly.composite(array)?.size())
}

/// Give a user port a handle to one provider, seen as interface `I`.
pub struct Use<I: ?Sized>(PhantomData<I>);

impl<I: ?Sized + 'static> Connector for Use<I> {
    type Args = (PortAddress, Address);

    fn connect(assembly: &Assembly, args: &Self::Args) -> Result<(), AssemblyError> {
        let (user, provider) = args;
        let handle = assembly.handle::<I>(provider)?;
        assembly.call(user, handle)
    }

    fn endpoints(args: &Self::Args) -> Vec<Endpoint> {
        let (user, provider) = args;
        vec![
            Endpoint::Port(user.clone()),
            Endpoint::Address(provider.clone()),
        ]
    }
}

/// Give a user port the value currently returned by a provider port.
pub struct Provide<P>(PhantomData<P>);

/// Alias kept for the "use what this port provides" reading.
pub type UseProvide<P> = Provide<P>;

impl<P: 'static> Connector for Provide<P> {
    type Args = (PortAddress, PortAddress);

    fn connect(assembly: &Assembly, args: &Self::Args) -> Result<(), AssemblyError> {
        let (user, provider) = args;
        let value = assembly.get::<P>(provider)?;
        assembly.call(user, value)
    }

    fn endpoints(args: &Self::Args) -> Vec<Endpoint> {
        let (user, provider) = args;
        vec![Endpoint::Port(user.clone()), Endpoint::Port(provider.clone())]
    }
}

/// Call a port with a literal value.
pub struct Set<V>(PhantomData<V>);

impl<V: Clone + 'static> Connector for Set<V> {
    type Args = (PortAddress, V);

    fn connect(assembly: &Assembly, args: &Self::Args) -> Result<(), AssemblyError> {
        let (port, value) = args;
        assembly.call(port, value.clone())
    }

    fn endpoints(args: &Self::Args) -> Vec<Endpoint> {
        vec![Endpoint::Port(args.0.clone())]
    }
}

/// Call one user port once per element of an array, in index order.
pub struct MultiUse<I: ?Sized>(PhantomData<I>);

impl<I: ?Sized + 'static> Connector for MultiUse<I> {
    type Args = (PortAddress, Address);

    fn connect(assembly: &Assembly, args: &Self::Args) -> Result<(), AssemblyError> {
        let (user, array) = args;
        let size = resolving::<Self, _>(array_size(assembly, array))?;
        for i in 0..size {
            let handle = resolving::<Self, _>(assembly.handle::<I>(&array.child(i)))?;
            assembly.call(user, handle)?;
        }
        Ok(())
    }

    fn endpoints(args: &Self::Args) -> Vec<Endpoint> {
        let (user, array) = args;
        vec![
            Endpoint::Port(user.clone()),
            Endpoint::Address(array.clone()),
        ]
    }
}

/// Give the same provider to a named port of every array element.
pub struct MultiProvide<I: ?Sized>(PhantomData<I>);

impl<I: ?Sized + 'static> Connector for MultiProvide<I> {
    type Args = (Address, String, Address);

    fn connect(assembly: &Assembly, args: &Self::Args) -> Result<(), AssemblyError> {
        let (array, port, provider) = args;
        let handle = assembly.handle::<I>(provider)?;
        let size = resolving::<Self, _>(array_size(assembly, array))?;
        for i in 0..size {
            let user = PortAddress::new(port.as_str(), array.child(i));
            resolving::<Self, _>(assembly.call(&user, handle.clone()))?;
        }
        Ok(())
    }

    fn endpoints(args: &Self::Args) -> Vec<Endpoint> {
        let (array, port, provider) = args;
        vec![
            Endpoint::Port(PortAddress::new(port.as_str(), array)),
            Endpoint::Address(provider.clone()),
        ]
    }
}

/// Connect element `i` of one array to element `i` of another.
///
/// Both arrays must have the same size; anything else is an
/// [`AssemblyError::ArraySizeMismatch`].
pub struct ArrayOneToOne<I: ?Sized>(PhantomData<I>);

impl<I: ?Sized + 'static> Connector for ArrayOneToOne<I> {
    type Args = (Address, String, Address);

    fn connect(assembly: &Assembly, args: &Self::Args) -> Result<(), AssemblyError> {
        let (users, port, providers) = args;
        let left_size = resolving::<Self, _>(array_size(assembly, users))?;
        let right_size = resolving::<Self, _>(array_size(assembly, providers))?;
        if left_size != right_size {
            return Err(AssemblyError::ArraySizeMismatch {
                left: users.clone(),
                left_size,
                right: providers.clone(),
                right_size,
            });
        }
        for i in 0..left_size {
            let handle = resolving::<Self, _>(assembly.handle::<I>(&providers.child(i)))?;
            let user = PortAddress::new(port.as_str(), users.child(i));
            resolving::<Self, _>(assembly.call(&user, handle))?;
        }
        Ok(())
    }

    fn endpoints(args: &Self::Args) -> Vec<Endpoint> {
        let (users, port, providers) = args;
        vec![
            Endpoint::Port(PortAddress::new(port.as_str(), users)),
            Endpoint::Address(providers.clone()),
        ]
    }
}

/// Call one user port once per listed provider, in list order.
pub struct ListUse<I: ?Sized>(PhantomData<I>);

impl<I: ?Sized + 'static> Connector for ListUse<I> {
    type Args = (PortAddress, Vec<Address>);

    fn connect(assembly: &Assembly, args: &Self::Args) -> Result<(), AssemblyError> {
        let (user, providers) = args;
        for provider in providers {
            let handle = resolving::<Self, _>(assembly.handle::<I>(provider))?;
            assembly.call(user, handle)?;
        }
        Ok(())
    }

    fn endpoints(args: &Self::Args) -> Vec<Endpoint> {
        let (user, providers) = args;
        std::iter::once(Endpoint::Port(user.clone()))
            .chain(providers.iter().cloned().map(Endpoint::Address))
            .collect()
    }
}

/// Give element `i` of an array the value `i` of a list.
pub struct ArraySet<V>(PhantomData<V>);

impl<V: Clone + 'static> Connector for ArraySet<V> {
    type Args = (Address, String, Vec<V>);

    fn connect(assembly: &Assembly, args: &Self::Args) -> Result<(), AssemblyError> {
        let (array, port, values) = args;
        let size = resolving::<Self, _>(array_size(assembly, array))?;
        if size != values.len() {
            return Err(AssemblyError::ArraySizeMismatch {
                left: array.clone(),
                left_size: size,
                right: Address::new("<values>"),
                right_size: values.len(),
            });
        }
        for (i, value) in values.iter().enumerate() {
            let target = PortAddress::new(port.as_str(), array.child(i));
            resolving::<Self, _>(assembly.call(&target, value.clone()))?;
        }
        Ok(())
    }

    fn endpoints(args: &Self::Args) -> Vec<Endpoint> {
        vec![Endpoint::Port(PortAddress::new(args.1.as_str(), &args.0))]
    }
}

/// Composite generator: `size` components of type `C`, keyed `0..size`,
/// each built by the same constructor.
pub struct Array<C> {
    size: usize,
    build: Rc<dyn Fn() -> C>,
}

impl<C: Component> Array<C> {
    /// An array of `size` components built by `build`.
    pub fn new(size: usize, build: impl Fn() -> C + 'static) -> Self {
        Self {
            size,
            build: Rc::new(build),
        }
    }

    /// Number of elements.
    pub fn size(&self) -> usize {
        self.size
    }
}

impl<C: Component> Contents for Array<C> {
    fn contents(&self, model: &mut Model<Draft>) {
        for i in 0..self.size {
            let build = Rc::clone(&self.build);
            model.component(i, move || build());
        }
    }
}
