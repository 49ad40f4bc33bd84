//! Type-erased, signature-checked ports.
//!
//! A component fills a [`Ports`] table in `declare_ports`. Each entry records
//! the exact argument type it was registered with; every call compares the
//! caller's argument type against it before anything runs, so a mismatch is
//! a [`PortError::TypeMismatch`] rather than a bad cast.

use montage_types::{PortError, PortKind, short_type_name};
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::rc::Rc;

/// The argument type a port was registered with.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Signature {
    id: TypeId,
    name: &'static str,
}

impl Signature {
    /// Signature of a port taking (or providing) `A`.
    pub fn of<A: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<A>(),
            name: std::any::type_name::<A>(),
        }
    }

    /// Readable type name, module paths stripped.
    pub fn name(&self) -> String {
        short_type_name(self.name)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Public description of one declared port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Port name.
    pub name: String,
    /// What the port does.
    pub kind: PortKind,
    /// Argument (or provided value) type.
    pub signature: Signature,
}

type SetFn<C> = Box<dyn Fn(&mut C, Box<dyn Any>) -> Result<(), Box<dyn Any>>>;
type ProvideFn<C> = Box<dyn Fn(&C) -> Box<dyn Any>>;
type CastFn<C> = Box<dyn Fn(Rc<RefCell<C>>) -> Box<dyn Any>>;

enum Binding<C> {
    Set(SetFn<C>),
    Provide(ProvideFn<C>),
}

struct Port<C> {
    kind: PortKind,
    signature: Signature,
    binding: Binding<C>,
}

/// Port and interface table of a component of type `C`.
///
/// Filled once by [`Component::declare_ports`](crate::Component::declare_ports).
/// Registering a second port under an existing name replaces the first.
pub struct Ports<C> {
    ports: BTreeMap<String, Port<C>>,
    interfaces: HashMap<TypeId, CastFn<C>>,
}

impl<C: 'static> Ports<C> {
    pub(crate) fn new() -> Self {
        let mut interfaces: HashMap<TypeId, CastFn<C>> = HashMap::new();
        interfaces.insert(
            TypeId::of::<C>(),
            Box::new(|cell: Rc<RefCell<C>>| Box::new(cell) as Box<dyn Any>),
        );
        Self {
            ports: BTreeMap::new(),
            interfaces,
        }
    }

    fn insert(&mut self, name: &str, kind: PortKind, signature: Signature, binding: Binding<C>) {
        let replaced = self
            .ports
            .insert(
                name.to_owned(),
                Port {
                    kind,
                    signature,
                    binding,
                },
            )
            .is_some();
        if replaced {
            tracing::debug!(port = name, "port redeclared, keeping the last declaration");
        }
    }

    /// Declare a port that calls `setter` with the argument.
    ///
    /// Ports taking several arguments take them as one tuple.
    pub fn setter<A, F>(&mut self, name: &str, setter: F) -> &mut Self
    where
        A: 'static,
        F: Fn(&mut C, A) + 'static,
    {
        let binding = Binding::Set(Box::new(
            move |this: &mut C, args: Box<dyn Any>| -> Result<(), Box<dyn Any>> {
                let args = args.downcast::<A>()?;
                setter(this, *args);
                Ok(())
            },
        ));
        self.insert(name, PortKind::Setter, Signature::of::<A>(), binding);
        self
    }

    /// Declare a port that overwrites a data member.
    pub fn field<A, F>(&mut self, name: &str, field: F) -> &mut Self
    where
        A: 'static,
        F: Fn(&mut C) -> &mut A + 'static,
    {
        let binding = Binding::Set(Box::new(
            move |this: &mut C, args: Box<dyn Any>| -> Result<(), Box<dyn Any>> {
                let value = args.downcast::<A>()?;
                *field(this) = *value;
                Ok(())
            },
        ));
        self.insert(name, PortKind::Field, Signature::of::<A>(), binding);
        self
    }

    /// Declare a port that returns a value on request.
    pub fn provider<P, F>(&mut self, name: &str, provide: F) -> &mut Self
    where
        P: 'static,
        F: Fn(&C) -> P + 'static,
    {
        let binding = Binding::Provide(Box::new(move |this: &C| {
            Box::new(provide(this)) as Box<dyn Any>
        }));
        self.insert(name, PortKind::Provider, Signature::of::<P>(), binding);
        self
    }

    /// Declare that the component can be referenced as the interface `I`.
    ///
    /// The cast is an unsizing coercion:
    ///
    /// ```ignore
    /// ports.interface::<dyn IntProvider>(|c| c as Rc<RefCell<dyn IntProvider>>);
    /// ```
    ///
    /// Every component is implicitly referenceable as its own type.
    pub fn interface<I>(&mut self, cast: fn(Rc<RefCell<C>>) -> Rc<RefCell<I>>) -> &mut Self
    where
        I: ?Sized + 'static,
    {
        self.interfaces.insert(
            TypeId::of::<I>(),
            Box::new(move |cell: Rc<RefCell<C>>| Box::new(cast(cell)) as Box<dyn Any>),
        );
        self
    }
}

/// A port table bound to its instance, with the component type erased.
pub(crate) trait BoundPorts {
    fn set(
        &self,
        owner: &str,
        port: &str,
        signature: Signature,
        args: Box<dyn Any>,
    ) -> Result<(), PortError>;
    fn get(&self, owner: &str, port: &str, signature: Signature)
    -> Result<Box<dyn Any>, PortError>;
    fn cast(&self, interface: TypeId) -> Option<Box<dyn Any>>;
    fn cell(&self) -> &dyn Any;
    fn debug(&self) -> Option<String>;
    fn info(&self) -> Vec<PortInfo>;
}

pub(crate) struct Bound<C> {
    pub(crate) cell: Rc<RefCell<C>>,
    pub(crate) ports: Ports<C>,
}

impl<C> Bound<C> {
    fn lookup(&self, owner: &str, port: &str) -> Result<&Port<C>, PortError> {
        self.ports.ports.get(port).ok_or_else(|| PortError::NotFound {
            component: owner.to_owned(),
            port: port.to_owned(),
        })
    }
}

fn mismatch(owner: &str, port: &str, expected: Signature, found: Signature) -> PortError {
    PortError::TypeMismatch {
        component: owner.to_owned(),
        port: port.to_owned(),
        expected: expected.name(),
        found: found.name(),
    }
}

fn busy(owner: &str) -> PortError {
    PortError::Busy {
        component: owner.to_owned(),
    }
}

impl<C: crate::Component> BoundPorts for Bound<C> {
    fn set(
        &self,
        owner: &str,
        port: &str,
        signature: Signature,
        args: Box<dyn Any>,
    ) -> Result<(), PortError> {
        let entry = self.lookup(owner, port)?;
        let Binding::Set(set) = &entry.binding else {
            return Err(PortError::KindMismatch {
                component: owner.to_owned(),
                port: port.to_owned(),
                expected: PortKind::Setter,
                actual: entry.kind,
            });
        };
        if entry.signature != signature {
            return Err(mismatch(owner, port, entry.signature, signature));
        }
        let mut this = self.cell.try_borrow_mut().map_err(|_| busy(owner))?;
        set(&mut this, args).map_err(|_| mismatch(owner, port, entry.signature, signature))
    }

    fn get(
        &self,
        owner: &str,
        port: &str,
        signature: Signature,
    ) -> Result<Box<dyn Any>, PortError> {
        let entry = self.lookup(owner, port)?;
        let Binding::Provide(provide) = &entry.binding else {
            return Err(PortError::KindMismatch {
                component: owner.to_owned(),
                port: port.to_owned(),
                expected: PortKind::Provider,
                actual: entry.kind,
            });
        };
        if entry.signature != signature {
            return Err(mismatch(owner, port, entry.signature, signature));
        }
        let this = self.cell.try_borrow().map_err(|_| busy(owner))?;
        Ok(provide(&this))
    }

    fn cast(&self, interface: TypeId) -> Option<Box<dyn Any>> {
        let cast = self.ports.interfaces.get(&interface)?;
        Some(cast(Rc::clone(&self.cell)))
    }

    fn cell(&self) -> &dyn Any {
        &*self.cell
    }

    fn debug(&self) -> Option<String> {
        self.cell.try_borrow().ok().map(|c| c.debug())
    }

    fn info(&self) -> Vec<PortInfo> {
        self.ports
            .ports
            .iter()
            .map(|(name, port)| PortInfo {
                name: name.clone(),
                kind: port.kind,
                signature: port.signature,
            })
            .collect()
    }
}
