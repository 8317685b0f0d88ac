//! Prefix to namespace URI bindings collected from `xmlns` declarations.

use std::{collections::HashMap, rc::Rc};

use super::{
    NodeType, XML_XML_NAMESPACE,
    node::{Node, NodeData, NodeRef},
};

/// The namespace bindings declared on one Element.
///
/// The default namespace is kept apart from prefixed bindings.\
/// An empty URI records an undeclaration (`xmlns=""`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingScope {
    default: Option<Rc<str>>,
    prefixes: HashMap<Rc<str>, Rc<str>>,
}

impl BindingScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.default = None;
        self.prefixes.clear();
    }

    /// Bind `prefix` (or the default namespace if `None`) to `namespace_uri`,
    /// replacing any previous binding of this scope.
    pub fn add(&mut self, prefix: Option<&str>, namespace_uri: &str) {
        match prefix.filter(|p| !p.is_empty()) {
            Some(prefix) => {
                self.prefixes.insert(prefix.into(), namespace_uri.into());
            }
            None => self.default = Some(namespace_uri.into()),
        }
    }

    /// The binding declared in this scope only.
    pub fn get(&self, prefix: Option<&str>) -> Option<Rc<str>> {
        match prefix.filter(|p| !p.is_empty()) {
            Some(prefix) => self.prefixes.get(prefix).cloned(),
            None => self.default.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.prefixes.len() + usize::from(self.default.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Resolve `prefix` from the scope of `element`, walking up to the nearest
/// ancestor Element that declares it.
///
/// The first declaration found wins. If it is an undeclaration, the prefix is unbound.\
/// The `xml` prefix is always bound to the XML namespace.
pub(super) fn find_binding(element: &NodeRef, prefix: Option<&str>) -> Option<Rc<str>> {
    let prefix = prefix.filter(|p| !p.is_empty());
    if prefix == Some("xml") {
        return Some(XML_XML_NAMESPACE.into());
    }

    let mut current = Some(element.clone());
    while let Some(node) = current {
        if node.node_type() == NodeType::Element {
            let found = match &node.record().data {
                NodeData::Element(data) => data.bindings.get(prefix),
                _ => None,
            };
            if let Some(uri) = found {
                return Some(uri).filter(|uri| !uri.is_empty());
            }
        }
        current = node.parent_node();
    }
    None
}

/// The in-scope prefix of `element` that resolves to `namespace_uri`.
///
/// A prefix shadowed by a nearer declaration is skipped. If several prefixes
/// qualify, the smallest one is returned. The default namespace is not considered.
pub(super) fn find_prefix(element: &NodeRef, namespace_uri: &str) -> Option<Rc<str>> {
    if namespace_uri == XML_XML_NAMESPACE {
        return Some("xml".into());
    }

    let mut candidates = vec![];
    let mut current = Some(element.clone());
    while let Some(node) = current {
        if let NodeData::Element(data) = &node.record().data {
            candidates.extend(
                data.bindings
                    .prefixes
                    .iter()
                    .filter(|(_, uri)| uri.as_ref() == namespace_uri)
                    .map(|(prefix, _)| prefix.clone()),
            );
        }
        current = node.parent_node();
    }
    candidates
        .into_iter()
        .filter(|prefix| {
            find_binding(element, Some(prefix.as_ref())).as_deref() == Some(namespace_uri)
        })
        .min()
}
