use std::{cell::RefCell, rc::Rc};

use super::{
    DOMException, NodeType, check_owner_document_sameness,
    node::{Node, NodeRef, NodeWeakRef},
};

/// Implementation of [Interface NamedNodeMap](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1780488922).
///
/// Items are enumerated in insertion order and looked up by name, or by
/// namespace URI and local name.
///
/// Since the data is shared by `Rc`, clone means shallow copy.
#[derive(Clone)]
pub struct NamedNodeMap {
    /// The element owning this map if this is an attribute map.
    owner_element: Option<NodeWeakRef>,
    /// The only kinds of node that can be stored.
    accepts: &'static [NodeType],
    data: Rc<RefCell<Vec<NodeRef>>>,
}

impl NamedNodeMap {
    /// Create an attribute map owned by the element `owner_element`.
    pub(super) fn attributes(owner_element: &NodeWeakRef) -> Self {
        Self {
            owner_element: Some(owner_element.clone()),
            accepts: &[NodeType::Attribute],
            data: Rc::new(RefCell::new(vec![])),
        }
    }

    /// Create a map storing nodes of `kind` only, with no owner element.
    pub(super) fn of_kind(kind: &'static [NodeType]) -> Self {
        Self {
            owner_element: None,
            accepts: kind,
            data: Rc::new(RefCell::new(vec![])),
        }
    }

    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Implementation of [`item`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-349467F9) method.
    pub fn item(&self, index: usize) -> Option<NodeRef> {
        self.data.borrow().get(index).cloned()
    }

    /// Snapshot of the items in insertion order.
    pub fn items(&self) -> Vec<NodeRef> {
        self.data.borrow().clone()
    }

    pub(super) fn index_of(&self, node: &NodeRef) -> Option<usize> {
        self.data
            .borrow()
            .iter()
            .position(|item| item.is_same_node(node))
    }

    fn position_by_name(&self, name: &str) -> Option<usize> {
        self.data
            .borrow()
            .iter()
            .position(|item| item.node_name().as_ref() == name)
    }

    fn position_by_ns(&self, namespace_uri: Option<&str>, local_name: &str) -> Option<usize> {
        let namespace_uri = namespace_uri.filter(|uri| !uri.is_empty());
        self.data.borrow().iter().position(|item| {
            item.namespace_uri().as_deref() == namespace_uri
                && item
                    .local_name()
                    .unwrap_or_else(|| item.node_name())
                    .as_ref()
                    == local_name
        })
    }

    /// Implementation of [`getNamedItem`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1074577549) method.
    pub fn get_named_item(&self, name: &str) -> Option<NodeRef> {
        self.position_by_name(name).and_then(|index| self.item(index))
    }

    /// Implementation of [`getNamedItemNS`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-getNamedItemNS) method.
    pub fn get_named_item_ns(&self, namespace_uri: Option<&str>, local_name: &str) -> Option<NodeRef> {
        self.position_by_ns(namespace_uri, local_name)
            .and_then(|index| self.item(index))
    }

    /// Check that `arg` can be stored in this map.
    fn check_insertion(&self, arg: &NodeRef) -> Result<(), DOMException> {
        if !self.accepts.contains(&arg.node_type()) {
            return Err(DOMException::HierarchyRequestErr);
        }
        let Some(owner) = self.owner_element.as_ref().and_then(NodeWeakRef::upgrade) else {
            return Ok(());
        };
        if !check_owner_document_sameness(&owner, arg) {
            return Err(DOMException::WrongDocumentErr);
        }
        if let Some(current) = arg.as_attribute().and_then(|attr| attr.owner_element()) {
            if !current.is_same_node(&owner) {
                return Err(DOMException::InuseAttributeErr);
            }
        }
        Ok(())
    }

    /// Put `arg` at `position` (or at the end) and return the replaced node.
    fn store(&mut self, arg: NodeRef, position: Option<usize>) -> Option<NodeRef> {
        // `arg` may already be stored under another key.
        if let Some(index) = self.index_of(&arg) {
            if position == Some(index) {
                return Some(arg);
            }
            self.data.borrow_mut().remove(index);
            return self.store(arg, position.map(|p| if p > index { p - 1 } else { p }));
        }

        if let Some(owner) = self.owner_element.as_ref() {
            arg.set_owner_element(Some(owner.clone()));
        }
        let replaced = match position {
            Some(index) => Some(std::mem::replace(&mut self.data.borrow_mut()[index], arg)),
            None => {
                self.data.borrow_mut().push(arg);
                None
            }
        };
        if let Some(replaced) = replaced.as_ref() {
            replaced.set_owner_element(None);
        }
        replaced
    }

    /// Implementation of [`setNamedItem`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1025163788) method.
    ///
    /// Insert or overwrite by `nodeName`. The overwritten node keeps its position.\
    /// Return the replaced node.
    ///
    /// # Errors
    /// - `WrongDocumentErr`: `arg` was created from another document than this map.
    /// - `InuseAttributeErr`: `arg` is an attribute of another element.
    /// - `HierarchyRequestErr`: `arg` cannot be stored in this map.
    pub fn set_named_item(&mut self, arg: NodeRef) -> Result<Option<NodeRef>, DOMException> {
        self.check_insertion(&arg)?;
        let position = self.position_by_name(&arg.node_name());
        Ok(self.store(arg, position))
    }

    /// Implementation of [`setNamedItemNS`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-setNamedItemNS) method.
    ///
    /// Same as [`NamedNodeMap::set_named_item`], but keyed by namespace URI and local name.
    pub fn set_named_item_ns(&mut self, arg: NodeRef) -> Result<Option<NodeRef>, DOMException> {
        self.check_insertion(&arg)?;
        let local_name = arg.local_name().unwrap_or_else(|| arg.node_name());
        let position = self.position_by_ns(arg.namespace_uri().as_deref(), &local_name);
        Ok(self.store(arg, position))
    }

    /// Append `arg` without any check.
    pub(super) fn push_unchecked(&mut self, arg: NodeRef) {
        if let Some(owner) = self.owner_element.as_ref() {
            arg.set_owner_element(Some(owner.clone()));
        }
        self.data.borrow_mut().push(arg);
    }

    fn remove_at(&mut self, index: usize) -> NodeRef {
        let removed = self.data.borrow_mut().remove(index);
        removed.set_owner_element(None);
        removed
    }

    /// Implementation of [`removeNamedItem`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-D58B193) method.
    ///
    /// Return the removed node. If no node has this name, nothing happens.
    pub fn remove_named_item(&mut self, name: &str) -> Option<NodeRef> {
        let index = self.position_by_name(name)?;
        Some(self.remove_at(index))
    }

    /// Implementation of [`removeNamedItemNS`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-removeNamedItemNS) method.
    pub fn remove_named_item_ns(
        &mut self,
        namespace_uri: Option<&str>,
        local_name: &str,
    ) -> Option<NodeRef> {
        let index = self.position_by_ns(namespace_uri, local_name)?;
        Some(self.remove_at(index))
    }

    /// Remove exactly `node` if it is stored in this map.
    pub(super) fn remove_node(&mut self, node: &NodeRef) -> Option<NodeRef> {
        let index = self.index_of(node)?;
        Some(self.remove_at(index))
    }

    /// Keep only the nodes for which `f` returns `true`.
    pub(super) fn retain(&mut self, mut f: impl FnMut(&NodeRef) -> bool) {
        let removed = {
            let mut data = self.data.borrow_mut();
            let (kept, removed) = data.drain(..).partition::<Vec<_>, _>(|node| f(node));
            *data = kept;
            removed
        };
        for node in removed {
            node.set_owner_element(None);
        }
    }
}
