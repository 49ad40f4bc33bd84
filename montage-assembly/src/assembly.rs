//! Live instance trees built from models.

use crate::config::AssemblyConfig;
use crate::model::Model;
use crate::stage::{Draft, Expanded, Instantiated};
use montage_component::{Component, Handle, Leaf};
use montage_types::{Address, AssemblyError, DELIMITER, PortAddress, PortError, short_type_name};
use std::cell::{Ref, RefCell, RefMut};
use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::rc::Rc;

/// One entry of an assembly: a component or a nested assembly.
#[derive(Debug)]
pub enum Instance {
    /// A component and its port table.
    Leaf(Leaf),
    /// A composite.
    Group(Assembly),
}

impl Instance {
    /// Qualified name.
    pub fn name(&self) -> &str {
        match self {
            Self::Leaf(leaf) => leaf.name(),
            Self::Group(group) => group.name(),
        }
    }

    /// Debug string: the component's own, or the composite listing.
    pub fn debug(&self) -> String {
        match self {
            Self::Leaf(leaf) => leaf.debug(),
            Self::Group(group) => group.debug(),
        }
    }

    /// The leaf, if this is one.
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Group(_) => None,
        }
    }

    /// The nested assembly, if this is a composite.
    pub fn as_group(&self) -> Option<&Assembly> {
        match self {
            Self::Group(group) => Some(group),
            Self::Leaf(_) => None,
        }
    }
}

/// The live object tree produced from a [`Model`].
///
/// Construction builds every component of a level, then every nested
/// composite, and only then replays the level's operations in declaration
/// order, so no connector ever sees a neighbour that does not exist yet.
/// The assembly is the sole owner of its instances; handles given out
/// through ports stop resolving once it is dropped.
///
/// Any failure aborts construction and is returned; a half-built assembly
/// is never handed out.
pub struct Assembly {
    name: String,
    instances: BTreeMap<String, Instance>,
    model: Rc<Model<Instantiated>>,
}

impl Assembly {
    /// Expand a copy of `model` and instantiate it with default settings.
    pub fn new(model: &Model<Draft>) -> Result<Self, AssemblyError> {
        Self::with_config(model, AssemblyConfig::default())
    }

    /// Expand a copy of `model` and instantiate it.
    pub fn with_config(model: &Model<Draft>, config: AssemblyConfig) -> Result<Self, AssemblyError> {
        Self::from_expanded(model.clone().expand()?, config)
    }

    /// Instantiate an already expanded model.
    pub fn from_expanded(
        model: Model<Expanded>,
        config: AssemblyConfig,
    ) -> Result<Self, AssemblyError> {
        let name = config.prefix.clone();
        instantiate(Rc::new(model.into_stage()), name, &config.prefix)
    }

    /// Qualified name: the configured prefix at the root, prefix plus key
    /// for a composite.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The blueprint this level was built from.
    pub fn model(&self) -> &Model<Instantiated> {
        &self.model
    }

    /// Number of local instances.
    pub fn size(&self) -> usize {
        self.instances.len()
    }

    /// Local keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        self.instances.keys().map(String::as_str).collect()
    }

    /// Local instances, sorted by key.
    pub fn instances(&self) -> impl Iterator<Item = (&str, &Instance)> {
        self.instances.iter().map(|(key, instance)| (key.as_str(), instance))
    }

    /// True if something was instantiated at `address`.
    pub fn exists(&self, address: &Address) -> bool {
        self.instance(address).is_ok()
    }

    /// The instance at `address`, resolved level by level.
    pub fn instance(&self, address: &Address) -> Result<&Instance, AssemblyError> {
        let keys = address.keys();
        let mut level = self;
        for (depth, key) in keys.iter().enumerate() {
            let instance =
                level
                    .instances
                    .get(key)
                    .ok_or_else(|| AssemblyError::AddressNotFound {
                        address: address.clone(),
                        key: key.clone(),
                        known: level.instances.keys().cloned().collect(),
                    })?;
            if depth + 1 == keys.len() {
                return Ok(instance);
            }
            level = match instance {
                Instance::Group(group) => group,
                Instance::Leaf(_) => {
                    return Err(AssemblyError::CompositeNotFound {
                        address: Address::from_keys(&keys[..=depth])
                            .unwrap_or_else(|| address.clone()),
                    });
                }
            };
        }
        Err(AssemblyError::AddressNotFound {
            address: address.clone(),
            key: String::new(),
            known: self.instances.keys().cloned().collect(),
        })
    }

    /// The nested assembly at `address`.
    pub fn composite(&self, address: &Address) -> Result<&Assembly, AssemblyError> {
        self.instance(address)?
            .as_group()
            .ok_or_else(|| AssemblyError::CompositeNotFound {
                address: address.clone(),
            })
    }

    /// The component at `address`.
    pub fn leaf(&self, address: &Address) -> Result<&Leaf, AssemblyError> {
        self.instance(address)?
            .as_leaf()
            .ok_or_else(|| AssemblyError::TypeMismatch {
                address: address.clone(),
                expected: "component".to_owned(),
                found: "composite".to_owned(),
            })
    }

    fn cell<T: Component>(&self, address: &Address) -> Result<(&Leaf, &RefCell<T>), AssemblyError> {
        let leaf = self.leaf(address)?;
        let cell = leaf
            .downcast::<T>()
            .ok_or_else(|| AssemblyError::TypeMismatch {
                address: address.clone(),
                expected: short_type_name(std::any::type_name::<T>()),
                found: leaf.type_name().to_owned(),
            })?;
        Ok((leaf, cell))
    }

    /// Borrow the component at `address` as a `T`.
    pub fn at<T: Component>(&self, address: &Address) -> Result<Ref<'_, T>, AssemblyError> {
        let (leaf, cell) = self.cell::<T>(address)?;
        cell.try_borrow().map_err(|_| busy(leaf))
    }

    /// Mutably borrow the component at `address` as a `T`.
    pub fn at_mut<T: Component>(&self, address: &Address) -> Result<RefMut<'_, T>, AssemblyError> {
        let (leaf, cell) = self.cell::<T>(address)?;
        cell.try_borrow_mut().map_err(|_| busy(leaf))
    }

    /// A non-owning handle to the component at `address`, seen as `I`.
    pub fn handle<I: ?Sized + 'static>(&self, address: &Address) -> Result<Handle<I>, AssemblyError> {
        let leaf = self.leaf(address)?;
        leaf.handle::<I>().map_err(|err| match err {
            PortError::InterfaceNotProvided { interface, .. } => AssemblyError::TypeMismatch {
                address: address.clone(),
                expected: interface,
                found: leaf.type_name().to_owned(),
            },
            other => AssemblyError::Component(other),
        })
    }

    /// Call a setter or field port.
    pub fn call<A: 'static>(&self, port: &PortAddress, args: A) -> Result<(), AssemblyError> {
        self.leaf(&port.address)?
            .set(&port.port, args)
            .map_err(|source| AssemblyError::Port {
                port: port.clone(),
                source,
            })
    }

    /// Read a provider port.
    pub fn get<P: 'static>(&self, port: &PortAddress) -> Result<P, AssemblyError> {
        self.leaf(&port.address)?
            .get(&port.port)
            .map_err(|source| AssemblyError::Port {
                port: port.clone(),
                source,
            })
    }

    /// Every component, at any depth, that can be referenced as `I`, in
    /// address order.
    pub fn find_all<I: ?Sized + 'static>(&self) -> Vec<(Address, Handle<I>)> {
        let mut found = Vec::new();
        self.collect_handles(None, &mut found);
        found
    }

    fn collect_handles<I: ?Sized + 'static>(
        &self,
        prefix: Option<&Address>,
        out: &mut Vec<(Address, Handle<I>)>,
    ) {
        for (key, instance) in &self.instances {
            let address = match prefix {
                Some(prefix) => prefix.child(key),
                None => Address::new(key),
            };
            match instance {
                Instance::Leaf(leaf) => {
                    if let Ok(handle) = leaf.handle::<I>() {
                        out.push((address, handle));
                    }
                }
                Instance::Group(group) => group.collect_handles(Some(&address), out),
            }
        }
    }

    /// Composite listing: one `key: debug` line per child.
    pub fn debug(&self) -> String {
        let mut out = String::from("Composite {\n");
        for (key, instance) in &self.instances {
            out.push_str(key);
            out.push_str(": ");
            out.push_str(&instance.debug());
            out.push('\n');
        }
        out.push_str("}\n");
        out
    }

    /// Write one `qualifiedName: debug` line per local instance, sorted by
    /// key.
    pub fn print_all(&self, out: &mut impl io::Write) -> io::Result<()> {
        for instance in self.instances.values() {
            writeln!(out, "{}: {}", instance.name(), instance.debug())?;
        }
        Ok(())
    }
}

impl fmt::Debug for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assembly")
            .field("name", &self.name)
            .field("instances", &self.instances)
            .finish_non_exhaustive()
    }
}

fn busy(leaf: &Leaf) -> AssemblyError {
    AssemblyError::Component(PortError::Busy {
        component: leaf.name().to_owned(),
    })
}

fn instantiate(
    model: Rc<Model<Instantiated>>,
    name: String,
    prefix: &str,
) -> Result<Assembly, AssemblyError> {
    let mut instances = BTreeMap::new();
    for (key, builder) in model.builders() {
        let qualified = format!("{prefix}{key}");
        tracing::debug!(component = %qualified, kind = builder.type_name(), "instantiating component");
        instances.insert(key.clone(), Instance::Leaf(builder.build(qualified)));
    }
    for (key, sub) in model.sub_models() {
        let qualified = format!("{prefix}{key}");
        tracing::debug!(composite = %qualified, "instantiating composite");
        let nested_prefix = format!("{qualified}{DELIMITER}");
        let group = instantiate(Rc::clone(sub), qualified, &nested_prefix)?;
        instances.insert(key.clone(), Instance::Group(group));
    }
    let assembly = Assembly {
        name,
        instances,
        model,
    };
    for op in assembly.model.operations() {
        tracing::trace!(operation = %op, "replaying operation");
        op.replay(&assembly).inspect_err(|err| {
            tracing::debug!(operation = %op, error = %err, "operation failed");
        })?;
    }
    Ok(assembly)
}
