//! A constructed component bound to its port table.

use crate::component::Component;
use crate::handle::Handle;
use crate::port::{Bound, BoundPorts, PortInfo, Ports, Signature};
use montage_types::{PortError, short_type_name};
use std::any::TypeId;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// A live component instance, its qualified name and its frozen port table.
///
/// The leaf holds the only strong reference to the instance. Everything
/// else (handles given out through ports) is weak.
pub struct Leaf {
    name: String,
    type_name: String,
    bound: Box<dyn BoundPorts>,
}

impl Leaf {
    /// Wrap a freshly constructed component, collecting its ports.
    pub fn new<C: Component>(name: impl Into<String>, instance: C) -> Self {
        let mut ports = Ports::new();
        instance.declare_ports(&mut ports);
        Self {
            name: name.into(),
            type_name: short_type_name(std::any::type_name::<C>()),
            bound: Box::new(Bound {
                cell: Rc::new(RefCell::new(instance)),
                ports,
            }),
        }
    }

    /// Qualified name assigned at construction.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Concrete type of the instance, module paths stripped.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Call a setter or field port with `args`.
    ///
    /// The bound behavior runs immediately. Fails if the port does not exist,
    /// is a provider, or was declared with a type other than `A`.
    pub fn set<A: 'static>(&self, port: &str, args: A) -> Result<(), PortError> {
        tracing::trace!(component = %self.name, port, "setting port");
        self.bound
            .set(&self.name, port, Signature::of::<A>(), Box::new(args))
    }

    /// Read the current value of a provider port.
    pub fn get<P: 'static>(&self, port: &str) -> Result<P, PortError> {
        let value = self.bound.get(&self.name, port, Signature::of::<P>())?;
        value
            .downcast::<P>()
            .map(|v| *v)
            .map_err(|_| PortError::TypeMismatch {
                component: self.name.clone(),
                port: port.to_owned(),
                expected: short_type_name(std::any::type_name::<P>()),
                found: "another type".to_owned(),
            })
    }

    /// A non-owning handle to the instance seen as interface `I`.
    ///
    /// `I` is either the concrete component type or an interface the
    /// component declared with [`Ports::interface`].
    pub fn handle<I: ?Sized + 'static>(&self) -> Result<Handle<I>, PortError> {
        let not_provided = || PortError::InterfaceNotProvided {
            component: self.name.clone(),
            interface: short_type_name(std::any::type_name::<I>()),
        };
        let cast = self
            .bound
            .cast(TypeId::of::<I>())
            .ok_or_else(not_provided)?;
        let target = cast
            .downcast::<Rc<RefCell<I>>>()
            .map_err(|_| not_provided())?;
        Ok(Handle::new(&self.name, &target))
    }

    /// The instance, if it is a `T`.
    pub fn downcast<T: Component>(&self) -> Option<&RefCell<T>> {
        self.bound.cell().downcast_ref::<RefCell<T>>()
    }

    /// True if the instance is a `T`.
    pub fn is<T: Component>(&self) -> bool {
        self.downcast::<T>().is_some()
    }

    /// Declared ports, sorted by name.
    pub fn ports(&self) -> Vec<PortInfo> {
        self.bound.info()
    }

    /// The component's debug string, or its type name while it is mutably
    /// borrowed.
    pub fn debug(&self) -> String {
        self.bound
            .debug()
            .unwrap_or_else(|| format!("{} (borrowed)", self.type_name))
    }
}

impl fmt::Debug for Leaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Leaf")
            .field("name", &self.name)
            .field("type", &self.type_name)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use montage_types::PortKind;

    trait Speaker {
        fn speak(&self) -> String;
    }

    #[derive(Default)]
    struct Parrot {
        word: String,
        times: usize,
    }

    impl Speaker for Parrot {
        fn speak(&self) -> String {
            self.word.repeat(self.times)
        }
    }

    impl Component for Parrot {
        fn declare_ports(&self, ports: &mut Ports<Self>) {
            ports
                .field("word", |p: &mut Self| &mut p.word)
                .setter("repeat", |p: &mut Self, (word, times): (String, usize)| {
                    p.word = word;
                    p.times = times;
                })
                .provider("speech", |p: &Self| p.speak())
                .interface::<dyn Speaker>(|c| c as Rc<RefCell<dyn Speaker>>);
        }

        fn debug(&self) -> String {
            format!("Parrot({})", self.word)
        }
    }

    #[test]
    fn set_then_get() {
        let leaf = Leaf::new("parrot", Parrot::default());
        leaf.set("repeat", ("hi".to_owned(), 2usize)).unwrap();
        assert_eq!(leaf.get::<String>("speech").unwrap(), "hihi");
        leaf.set("word", "yo".to_owned()).unwrap();
        assert_eq!(leaf.debug(), "Parrot(yo)");
    }

    #[test]
    fn missing_port_names_component() {
        let leaf = Leaf::new("top_parrot", Parrot::default());
        let err = leaf.set("volume", 3).unwrap_err();
        assert!(matches!(err, PortError::NotFound { .. }));
        assert!(err.to_string().contains("top_parrot"));
    }

    #[test]
    fn wrong_argument_type_is_rejected() {
        let leaf = Leaf::new("parrot", Parrot::default());
        let err = leaf.set("word", 42i32).unwrap_err();
        match err {
            PortError::TypeMismatch {
                expected, found, ..
            } => {
                assert_eq!(expected, "String");
                assert_eq!(found, "i32");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn get_on_setter_fails() {
        let leaf = Leaf::new("parrot", Parrot::default());
        let err = leaf.get::<String>("word").unwrap_err();
        assert!(matches!(
            err,
            PortError::KindMismatch {
                actual: PortKind::Field,
                ..
            }
        ));
    }

    #[test]
    fn handle_through_declared_interface() {
        let leaf = Leaf::new("parrot", Parrot::default());
        leaf.set("repeat", ("a".to_owned(), 3usize)).unwrap();
        let handle = leaf.handle::<dyn Speaker>().unwrap();
        assert_eq!(handle.with(|s| s.speak()).unwrap(), "aaa");
        assert!(leaf.handle::<Parrot>().is_ok());
        assert!(matches!(
            leaf.handle::<dyn fmt::Debug>(),
            Err(PortError::InterfaceNotProvided { .. })
        ));
    }

    #[test]
    fn handles_dangle_after_leaf_drops() {
        let leaf = Leaf::new("parrot", Parrot::default());
        let handle = leaf.handle::<Parrot>().unwrap();
        drop(leaf);
        assert!(matches!(
            handle.with(|p| p.times),
            Err(PortError::Dangling { .. })
        ));
    }

    #[test]
    fn ports_are_listed_sorted() {
        let leaf = Leaf::new("parrot", Parrot::default());
        let names: Vec<_> = leaf.ports().into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["repeat", "speech", "word"]);
    }
}
