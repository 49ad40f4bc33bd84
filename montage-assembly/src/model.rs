//! Declarative blueprints.

use crate::connector::{Connector, Set, Use};
use crate::meta::{MetaComponent, MetaConnector, MetaOperation};
use crate::operation::Operation;
use crate::stage::{Draft, Expanded, Stage};
use montage_component::{Component, Leaf};
use montage_types::{Address, AssemblyError, PortAddress, short_type_name};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

/// Populates a fresh composite. Implemented by reusable, parameterised
/// sub-assemblies such as [`Array`](crate::Array).
pub trait Contents {
    /// Declare the composite's content into `model`.
    fn contents(&self, model: &mut Model<Draft>);
}

/// Deferred constructor of one component.
#[derive(Clone)]
pub(crate) struct ComponentBuilder {
    type_name: String,
    build: Rc<dyn Fn(String) -> Leaf>,
}

impl ComponentBuilder {
    fn new<C: Component>(build: impl Fn() -> C + 'static) -> Self {
        Self {
            type_name: short_type_name(std::any::type_name::<C>()),
            build: Rc::new(move |name: String| Leaf::new(name, build())),
        }
    }

    pub(crate) fn build(&self, name: String) -> Leaf {
        (self.build)(name)
    }

    pub(crate) fn type_name(&self) -> &str {
        &self.type_name
    }
}

/// A blueprint of components, composites and the operations wiring them.
///
/// Models are values: nothing done to a clone shows through in the original.
/// Nested composites are shared between clones and copied on first write. Declarations are only accepted in
/// the [`Draft`] stage; [`Model::expand`] runs the meta-operations and closes
/// the blueprint.
///
/// ```
/// use montage_assembly::{Assembly, Model, Use};
/// use montage_component::test_utils::{IntBox, IntProvider, IntUser};
/// use montage_types::PortAddress;
///
/// let mut model = Model::new();
/// model.component("user", IntUser::new);
/// model.component("box", || IntBox::new(5));
/// model.connect::<Use<dyn IntProvider>>((PortAddress::new("ptr", "user"), "box".into()));
///
/// let assembly = Assembly::new(&model).unwrap();
/// let user = assembly.at::<IntUser>(&"user".into()).unwrap();
/// assert_eq!(user.read().unwrap().unwrap(), 5);
/// ```
pub struct Model<S: Stage = Draft> {
    components: BTreeMap<String, ComponentBuilder>,
    composites: BTreeMap<String, Rc<Model<S>>>,
    operations: Vec<Operation>,
    annotations: BTreeMap<Address, BTreeMap<String, String>>,
    meta: Vec<MetaOperation>,
    stage: PhantomData<S>,
}

impl<S: Stage> Clone for Model<S> {
    fn clone(&self) -> Self {
        Self {
            components: self.components.clone(),
            composites: self.composites.clone(),
            operations: self.operations.clone(),
            annotations: self.annotations.clone(),
            meta: self.meta.clone(),
            stage: PhantomData,
        }
    }
}

impl Default for Model<Draft> {
    fn default() -> Self {
        Self::new()
    }
}

impl Model<Draft> {
    /// Create an empty draft.
    pub fn new() -> Self {
        Self {
            components: BTreeMap::new(),
            composites: BTreeMap::new(),
            operations: Vec::new(),
            annotations: BTreeMap::new(),
            meta: Vec::new(),
            stage: PhantomData,
        }
    }

    /// The model holding the last key of `address`, creating intermediate
    /// composites as needed.
    fn level_mut(&mut self, address: &Address) -> &mut Model<Draft> {
        let keys = address.keys();
        let mut level = self;
        for key in &keys[..keys.len() - 1] {
            if level.components.remove(key).is_some() {
                tracing::debug!(key = %key, "component replaced by composite");
            }
            level = Rc::make_mut(level.composites.entry(key.clone()).or_default());
        }
        level
    }

    /// Register a component built by `build` at `address`.
    ///
    /// A composite address registers inside the composite named by its head,
    /// creating it if absent. Declaring a key twice keeps the last
    /// declaration, whatever its kind.
    pub fn component<C, F>(&mut self, address: impl Into<Address>, build: F) -> ComponentRef<'_>
    where
        C: Component,
        F: Fn() -> C + 'static,
    {
        let address = address.into();
        let level = self.level_mut(&address);
        let key = address.last().to_owned();
        level.composites.remove(&key);
        level.components.insert(key, ComponentBuilder::new(build));
        ComponentRef {
            model: self,
            address,
        }
    }

    /// Register an empty composite at `address` and return it for filling.
    ///
    /// An existing composite at `address` is kept as is.
    pub fn composite(&mut self, address: impl Into<Address>) -> &mut Model<Draft> {
        let address = address.into();
        let level = self.level_mut(&address);
        let key = address.last().to_owned();
        level.components.remove(&key);
        Rc::make_mut(level.composites.entry(key).or_default())
    }

    /// Register a composite at `address` populated by `generator`.
    ///
    /// Replaces anything previously declared at `address`.
    pub fn composite_with<G: Contents>(
        &mut self,
        address: impl Into<Address>,
        generator: G,
    ) -> &mut Model<Draft> {
        let address = address.into();
        let mut sub = Model::new();
        generator.contents(&mut sub);
        let level = self.level_mut(&address);
        let key = address.last().to_owned();
        level.components.remove(&key);
        level.composites.insert(key.clone(), Rc::new(sub));
        Rc::make_mut(level.composites.entry(key).or_default())
    }

    /// Record a connector invocation, replayed after instantiation.
    ///
    /// Operations replay in declaration order, so when two operations target
    /// the same port the later one wins.
    pub fn connect<C: Connector>(&mut self, args: C::Args) -> &mut Self {
        self.operations.push(Operation::new::<C>(args));
        self
    }

    /// Record a meta-operation generating blueprint content at expansion.
    pub fn meta_connect<M: MetaConnector>(&mut self, args: M::Args) -> &mut Self {
        self.meta.push(MetaOperation::connector::<M>(args));
        self
    }

    /// Record a meta-operation declaring whatever belongs at `address`.
    pub fn meta_component<M: MetaComponent>(
        &mut self,
        address: impl Into<Address>,
        args: M::Args,
    ) -> &mut Self {
        self.meta
            .push(MetaOperation::component::<M>(address.into(), args));
        self
    }

    /// Attach a string property to `address`.
    ///
    /// Annotations are metadata only: they never declare or replace
    /// anything, and the address need not exist yet.
    pub fn annotate(
        &mut self,
        address: impl Into<Address>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> &mut Self {
        self.annotations
            .entry(address.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Mutable access to the composite at `address`.
    pub fn get_composite_mut(&mut self, address: &Address) -> Result<&mut Model<Draft>, AssemblyError> {
        let mut level = self;
        for key in address.keys() {
            level = level
                .composites
                .get_mut(key)
                .map(Rc::make_mut)
                .ok_or_else(|| AssemblyError::CompositeNotFound {
                    address: address.clone(),
                })?;
        }
        Ok(level)
    }

    /// Run every meta-operation, recursively, and close the blueprint.
    pub fn expand(mut self) -> Result<Model<Expanded>, AssemblyError> {
        self.apply_meta()?;
        Ok(self.into_stage())
    }

    fn apply_meta(&mut self) -> Result<(), AssemblyError> {
        let mut round = 0usize;
        while !self.meta.is_empty() {
            let pending = std::mem::take(&mut self.meta);
            tracing::debug!(round, count = pending.len(), "expanding meta-operations");
            for op in pending {
                op.apply(self)?;
            }
            round += 1;
        }
        for sub in self.composites.values_mut() {
            if sub.has_meta() {
                Rc::make_mut(sub).apply_meta()?;
            }
        }
        Ok(())
    }

    fn has_meta(&self) -> bool {
        !self.meta.is_empty() || self.composites.values().any(|sub| sub.has_meta())
    }

    /// Number of meta-operations waiting for expansion at this level.
    pub fn pending_meta(&self) -> usize {
        self.meta.len()
    }
}

impl<S: Stage> Model<S> {
    pub(crate) fn into_stage<T: Stage>(self) -> Model<T> {
        Model {
            components: self.components,
            composites: self
                .composites
                .into_iter()
                .map(|(key, sub)| (key, Rc::new(Rc::unwrap_or_clone(sub).into_stage())))
                .collect(),
            operations: self.operations,
            annotations: self.annotations,
            meta: self.meta,
            stage: PhantomData,
        }
    }

    /// The model holding the last key of `address`, if every intermediate
    /// composite exists.
    fn level(&self, address: &Address) -> Option<&Model<S>> {
        match address.parent() {
            Some(parent) => self.get_composite(&parent).ok(),
            None => Some(self),
        }
    }

    /// Number of local entries (components plus composites).
    pub fn size(&self) -> usize {
        self.components.len() + self.composites.len()
    }

    /// True if something is declared at `address`.
    pub fn exists(&self, address: &Address) -> bool {
        self.level(address).is_some_and(|level| {
            let key = address.last();
            level.components.contains_key(key) || level.composites.contains_key(key)
        })
    }

    /// True if `address` names a composite.
    pub fn is_composite(&self, address: &Address) -> bool {
        self.get_composite(address).is_ok()
    }

    /// The composite at `address`.
    pub fn get_composite(&self, address: &Address) -> Result<&Model<S>, AssemblyError> {
        let mut level = self;
        for key in address.keys() {
            level = level
                .composites
                .get(key)
                .map(|sub| &**sub)
                .ok_or_else(|| AssemblyError::CompositeNotFound {
                    address: address.clone(),
                })?;
        }
        Ok(level)
    }

    /// Type name of the component declared at `address`.
    pub fn component_type(&self, address: &Address) -> Option<&str> {
        self.level(address)?
            .components
            .get(address.last())
            .map(ComponentBuilder::type_name)
    }

    /// Local component keys, sorted.
    pub fn component_keys(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    /// Local composite keys, sorted.
    pub fn composite_keys(&self) -> impl Iterator<Item = &str> {
        self.composites.keys().map(String::as_str)
    }

    /// Local operations in declaration order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Read an annotation.
    ///
    /// Looks at this level first, then inside the composite named by the
    /// head of `address`, so annotations made on a nested model are found
    /// from its ancestors.
    pub fn get_annotation(&self, address: &Address, key: &str) -> Result<&str, AssemblyError> {
        self.find_annotation(address, key)
            .ok_or_else(|| AssemblyError::AnnotationNotFound {
                address: address.clone(),
                key: key.to_owned(),
            })
    }

    fn find_annotation(&self, address: &Address, key: &str) -> Option<&str> {
        if let Some(value) = self.annotations.get(address).and_then(|values| values.get(key)) {
            return Some(value.as_str());
        }
        let rest = address.rest()?;
        self.composites.get(address.first())?.find_annotation(&rest, key)
    }

    pub(crate) fn builders(&self) -> impl Iterator<Item = (&String, &ComponentBuilder)> {
        self.components.iter()
    }

    pub(crate) fn sub_models(&self) -> impl Iterator<Item = (&String, &Rc<Model<S>>)> {
        self.composites.iter()
    }

    fn write_dump(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        for (key, builder) in &self.components {
            writeln!(f, "{pad}Component \"{key}\" ({})", builder.type_name())?;
        }
        for (key, sub) in &self.composites {
            writeln!(f, "{pad}Composite \"{key}\" {{")?;
            sub.write_dump(f, indent + 1)?;
            writeln!(f, "{pad}}}")?;
        }
        for op in &self.operations {
            writeln!(f, "{pad}Operation {op}")?;
        }
        Ok(())
    }
}

impl<S: Stage> fmt::Display for Model<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_dump(f, 0)
    }
}

impl<S: Stage> fmt::Debug for Model<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("components", &self.components.keys().collect::<Vec<_>>())
            .field("composites", &self.composites)
            .field("operations", &self.operations)
            .field("meta", &self.meta.len())
            .finish()
    }
}

/// The component just registered by [`Model::component`], for chaining
/// wiring against it.
pub struct ComponentRef<'a> {
    model: &'a mut Model<Draft>,
    address: Address,
}

impl ComponentRef<'_> {
    /// Address the component was registered at.
    pub fn address(&self) -> &Address {
        &self.address
    }

    /// A port of this component.
    pub fn port(&self, name: &str) -> PortAddress {
        PortAddress::new(name, &self.address)
    }

    /// Record `Set`: call `port` with `value` after instantiation.
    pub fn set<V: Clone + 'static>(self, port: &str, value: V) -> Self {
        let target = self.port(port);
        self.model.connect::<Set<V>>((target, value));
        self
    }

    /// Record `Use<I>`: give `port` a handle to `provider`.
    pub fn uses<I: ?Sized + 'static>(self, port: &str, provider: impl Into<Address>) -> Self {
        let user = self.port(port);
        self.model.connect::<Use<I>>((user, provider.into()));
        self
    }

    /// Attach an annotation to this component.
    pub fn annotate(self, key: &str, value: &str) -> Self {
        self.model.annotate(&self.address, key, value);
        self
    }
}
