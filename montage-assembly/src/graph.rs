//! Introspection over recorded operations.

use crate::model::Model;
use crate::operation::Endpoint;
use crate::stage::Stage;
use montage_types::{Address, DELIMITER};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Dependency graph extracted from a model's operations.
///
/// Nodes are every address that appears as a connector endpoint. Edges run
/// from provider to user and come only from operations shaped
/// `(port, address)`, i.e. a single user port and a single provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Digraph {
    nodes: BTreeSet<Address>,
    edges: BTreeSet<(Address, Address)>,
}

impl Digraph {
    /// Every endpoint address.
    pub fn nodes(&self) -> &BTreeSet<Address> {
        &self.nodes
    }

    /// Provider to user edges.
    pub fn edges(&self) -> &BTreeSet<(Address, Address)> {
        &self.edges
    }

    /// True if `from` provides to `to`.
    pub fn contains_edge(&self, from: &Address, to: &Address) -> bool {
        self.edges.contains(&(from.clone(), to.clone()))
    }

    /// Users of `node`, in address order.
    pub fn successors<'a>(&'a self, node: &'a Address) -> impl Iterator<Item = &'a Address> {
        self.edges
            .iter()
            .filter(move |(from, _)| from == node)
            .map(|(_, to)| to)
    }

    /// Nodes ordered so every provider precedes its users, or `None` if the
    /// edges form a cycle. Ties break by address order.
    pub fn topological_order(&self) -> Option<Vec<Address>> {
        let mut incoming: BTreeMap<&Address, usize> =
            self.nodes.iter().map(|node| (node, 0)).collect();
        for (_, to) in &self.edges {
            *incoming.entry(to).or_default() += 1;
        }
        let mut ready: BTreeSet<&Address> = incoming
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(node, _)| *node)
            .collect();
        let mut order = Vec::with_capacity(incoming.len());
        while let Some(node) = ready.pop_first() {
            order.push(node.clone());
            for next in self.successors(node) {
                if let Some(count) = incoming.get_mut(next) {
                    *count -= 1;
                    if *count == 0 {
                        ready.insert(next);
                    }
                }
            }
        }
        (order.len() == incoming.len()).then_some(order)
    }

    fn extend<S: Stage>(&mut self, model: &Model<S>, prefix: Option<&Address>) {
        let place = |address: &Address| match prefix {
            Some(prefix) => prefix.join(address),
            None => address.clone(),
        };
        for op in model.operations() {
            for endpoint in op.endpoints() {
                self.nodes.insert(place(endpoint.address()));
            }
            if let Some((user, provider)) = op.dependency() {
                self.edges.insert((place(provider), place(&user.address)));
            }
        }
        for (key, sub) in model.sub_models() {
            let nested = match prefix {
                Some(prefix) => prefix.child(key),
                None => Address::new(key),
            };
            self.extend(sub, Some(&nested));
        }
    }
}

impl<S: Stage> Model<S> {
    /// Dependency graph of this model and every nested composite, addresses
    /// taken from this level.
    pub fn digraph(&self) -> Digraph {
        let mut graph = Digraph::default();
        graph.extend(self, None);
        graph
    }

    /// Qualified names of components up to `depth` levels of composite
    /// nesting, optionally including the composites themselves.
    ///
    /// Depth 0 lists only this level.
    pub fn all_component_names(&self, depth: usize, include_composites: bool) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_names("", depth, include_composites, &mut names);
        names
    }

    fn collect_names(
        &self,
        prefix: &str,
        depth: usize,
        include_composites: bool,
        out: &mut Vec<String>,
    ) {
        out.extend(self.component_keys().map(|key| format!("{prefix}{key}")));
        for (key, sub) in self.sub_models() {
            if include_composites {
                out.push(format!("{prefix}{key}"));
            }
            if depth > 0 {
                let nested = format!("{prefix}{key}{DELIMITER}");
                sub.collect_names(&nested, depth - 1, include_composites, out);
            }
        }
    }

    /// Graphviz rendering of the blueprint: components as nodes, composites
    /// as clusters, each operation as a point joined to its endpoints.
    pub fn dot(&self) -> Dot<'_, S> {
        Dot { model: self }
    }

    /// [`Model::dot`] as a string.
    pub fn to_dot(&self) -> String {
        self.dot().to_string()
    }
}

/// Display adapter returned by [`Model::dot`].
pub struct Dot<'a, S: Stage> {
    model: &'a Model<S>,
}

impl<S: Stage> fmt::Display for Dot<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("graph g {\n")?;
        write_level(f, self.model, "")?;
        f.write_str("}\n")
    }
}

fn write_level<S: Stage>(f: &mut fmt::Formatter<'_>, model: &Model<S>, prefix: &str) -> fmt::Result {
    for (key, builder) in model.builders() {
        let name = format!("{prefix}{key}");
        writeln!(
            f,
            "{name} [label=\"{name}\\n({})\" shape=component margin=0.15];",
            builder.type_name()
        )?;
    }
    for (i, op) in model.operations().iter().enumerate() {
        let point = format!("connect_{prefix}{i}");
        writeln!(f, "{point} [xlabel=\"{}\" shape=point];", op.connector())?;
        for endpoint in op.endpoints() {
            let target = endpoint.address();
            let target = if model.is_composite(target) {
                format!("cluster_{prefix}{target}")
            } else {
                format!("{prefix}{target}")
            };
            let port = match endpoint {
                Endpoint::Port(port) => port.port.as_str(),
                Endpoint::Address(_) => "",
            };
            writeln!(f, "{point} -- {target}[xlabel=\"{port}\"];")?;
        }
    }
    for (key, sub) in model.sub_models() {
        let path = format!("{prefix}{key}");
        writeln!(f, "subgraph cluster_{path} {{")?;
        write_level(f, sub, &format!("{path}{DELIMITER}"))?;
        f.write_str("}\n")?;
    }
    Ok(())
}
