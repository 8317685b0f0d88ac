use std::{
    cell::{Ref, RefCell, RefMut},
    collections::HashMap,
    fmt,
    rc::{Rc, Weak},
};

use crate::qname::{split_prefix_local, validate_ncname};

use super::{
    DOCUMENT_POSITION_CONTAINED_BY, DOCUMENT_POSITION_CONTAINS, DOCUMENT_POSITION_DISCONNECTED,
    DOCUMENT_POSITION_FOLLOWING, DOCUMENT_POSITION_IMPLEMENTATION_SPECIFIC,
    DOCUMENT_POSITION_PRECEDING, DOMException, DocumentPosition, NodeType, XML_NS_NAMESPACE,
    XML_XML_NAMESPACE, check_vertical_hierarchy,
    attr::AttrData,
    document::{DocumentContext, DocumentRef},
    document_type::DocumentTypeData,
    dom_implementation::DOMImplementation,
    element::ElementData,
    entity::EntityData,
    named_node_map::NamedNodeMap,
    notation::NotationData,
    user_data::{DOMUserData, OperationType, UserDataHandler, notify_user_data_handlers},
};

/// Kind-specific payload of a node.
pub(crate) enum NodeData {
    Element(ElementData),
    Attribute(AttrData),
    Text(String),
    CDATASection(String),
    Comment(String),
    ProcessingInstruction(String),
    EntityReference,
    Entity(EntityData),
    Notation(NotationData),
    DocumentType(DocumentTypeData),
    DocumentFragment,
    Document(DocumentContext),
}

impl NodeData {
    fn node_type(&self) -> NodeType {
        match self {
            NodeData::Element(_) => NodeType::Element,
            NodeData::Attribute(_) => NodeType::Attribute,
            NodeData::Text(_) => NodeType::Text,
            NodeData::CDATASection(_) => NodeType::CDATASection,
            NodeData::Comment(_) => NodeType::Comment,
            NodeData::ProcessingInstruction(_) => NodeType::ProcessingInstruction,
            NodeData::EntityReference => NodeType::EntityReference,
            NodeData::Entity(_) => NodeType::Entity,
            NodeData::Notation(_) => NodeType::Notation,
            NodeData::DocumentType(_) => NodeType::DocumentType,
            NodeData::DocumentFragment => NodeType::DocumentFragment,
            NodeData::Document(_) => NodeType::Document,
        }
    }

    fn character_data(&self) -> Option<&String> {
        match self {
            NodeData::Text(data)
            | NodeData::CDATASection(data)
            | NodeData::Comment(data)
            | NodeData::ProcessingInstruction(data) => Some(data),
            _ => None,
        }
    }

    fn character_data_mut(&mut self) -> Option<&mut String> {
        match self {
            NodeData::Text(data)
            | NodeData::CDATASection(data)
            | NodeData::Comment(data)
            | NodeData::ProcessingInstruction(data) => Some(data),
            _ => None,
        }
    }
}

pub(crate) type UserDataTable = HashMap<String, (DOMUserData, Option<Rc<dyn UserDataHandler>>)>;

/// One node of the tree.
///
/// Children are owned through `first_child` and the `next_sibling` chain.
/// `parent_node`, `previous_sibling` and `owner_document` are weak.
pub(crate) struct NodeRecord {
    pub(super) data: NodeData,
    pub(super) node_name: Rc<str>,
    pub(super) namespace_uri: Option<Rc<str>>,
    pub(super) prefix: Option<Rc<str>>,
    pub(super) local_name: Option<Rc<str>>,
    parent_node: Option<NodeWeakRef>,
    first_child: Option<NodeRef>,
    last_child: Option<NodeRef>,
    previous_sibling: Option<NodeWeakRef>,
    next_sibling: Option<NodeRef>,
    pub(super) owner_document: Option<NodeWeakRef>,
    pub(super) user_data: Option<UserDataTable>,
}

impl Drop for NodeRecord {
    fn drop(&mut self) {
        // Release the sibling chain iteratively, so that a long chain does not
        // overflow the stack. Stop at a child that is still referenced elsewhere.
        self.last_child = None;
        let mut next = self.first_child.take();
        while let Some(node) = next {
            if Rc::strong_count(&node.0) > 1 {
                break;
            }
            next = match node.0.try_borrow_mut() {
                Ok(mut record) => record.next_sibling.take(),
                Err(_) => None,
            };
        }
    }
}

/// A shared handle to any node.
///
/// Cloning the handle does not clone the node. Use [`Node::clone_node`] for that.
#[derive(Clone)]
pub struct NodeRef(pub(super) Rc<RefCell<NodeRecord>>);

impl NodeRef {
    /// Create a detached node.
    ///
    /// The qualified name of Element and Attribute nodes is split on the first `:`.
    pub(super) fn create(
        owner_document: Option<&NodeRef>,
        node_name: Rc<str>,
        namespace_uri: Option<Rc<str>>,
        data: impl FnOnce(&NodeWeakRef) -> NodeData,
    ) -> NodeRef {
        let record = Rc::new_cyclic(|weak| {
            let data = data(&NodeWeakRef(weak.clone()));
            let (prefix, local_name) = match data {
                NodeData::Element(_) | NodeData::Attribute(_) => {
                    let (prefix, local_name) = split_prefix_local(&node_name);
                    (prefix.map(Rc::from), local_name.map(Rc::from))
                }
                _ => (None, None),
            };
            RefCell::new(NodeRecord {
                data,
                node_name,
                namespace_uri,
                prefix,
                local_name,
                parent_node: None,
                first_child: None,
                last_child: None,
                previous_sibling: None,
                next_sibling: None,
                owner_document: owner_document.map(NodeRef::downgrade),
                user_data: None,
            })
        });
        NodeRef(record)
    }

    pub(super) fn record(&self) -> Ref<'_, NodeRecord> {
        self.0.borrow()
    }

    pub(super) fn record_mut(&self) -> RefMut<'_, NodeRecord> {
        self.0.borrow_mut()
    }

    pub fn downgrade(&self) -> NodeWeakRef {
        NodeWeakRef(Rc::downgrade(&self.0))
    }

    /// The document this node belongs to.\
    /// For a Document node, this is the node itself.
    pub(crate) fn document_node(&self) -> Option<NodeRef> {
        let record = self.record();
        if matches!(record.data, NodeData::Document(_)) {
            return Some(self.clone());
        }
        record.owner_document.as_ref().and_then(NodeWeakRef::upgrade)
    }

    /// The nearest ancestor that is an Element.
    pub(super) fn ancestor_element(&self) -> Option<NodeRef> {
        let mut current = self.parent_node();
        while let Some(node) = current {
            if node.node_type() == NodeType::Element {
                return Some(node);
            }
            current = node.parent_node();
        }
        None
    }

    /// The owner element for an Attribute, otherwise the parent node.
    fn container(&self) -> Option<NodeRef> {
        let record = self.record();
        match &record.data {
            NodeData::Attribute(attr) => attr.owner_element.as_ref().and_then(NodeWeakRef::upgrade),
            _ => record.parent_node.as_ref().and_then(NodeWeakRef::upgrade),
        }
    }

    pub(super) fn character_data(&self) -> Option<String> {
        self.record().data.character_data().cloned()
    }

    /// Apply `f` to the character data of Text, CDATASection, Comment and
    /// ProcessingInstruction nodes. Return `None` for other kinds.
    pub(super) fn with_character_data_mut<R>(&self, f: impl FnOnce(&mut String) -> R) -> Option<R> {
        self.record_mut().data.character_data_mut().map(f)
    }

    /// Replace the prefix and rebuild the qualified name, without any checks.
    pub(super) fn set_prefix_unchecked(&self, prefix: Option<Rc<str>>) {
        let mut record = self.record_mut();
        let local_name = record.local_name.clone().unwrap_or_else(|| "".into());
        record.node_name = match prefix.as_deref() {
            Some(prefix) => format!("{prefix}:{local_name}").into(),
            None => local_name,
        };
        record.prefix = prefix;
    }

    pub(super) fn set_namespace_uri_unchecked(&self, namespace_uri: Option<Rc<str>>) {
        self.record_mut().namespace_uri = namespace_uri;
    }

    /// Next node after `self` in document order, limited to the subtree of `root`.
    pub(super) fn following_in(&self, root: &NodeRef) -> Option<NodeRef> {
        if let Some(child) = self.first_child() {
            return Some(child);
        }
        let mut current = self.clone();
        loop {
            if current.is_same_node(root) {
                return None;
            }
            if let Some(next) = current.next_sibling() {
                return Some(next);
            }
            current = current.parent_node()?;
        }
    }

    /// Set the owner document of this node, its attributes and its descendants.
    ///
    /// Nodes that change their document are notified with [`OperationType::NodeAdopted`].
    pub(super) fn adopt_subtree(&self, document: &NodeRef) {
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            let moved = {
                let mut record = node.record_mut();
                let same = record
                    .owner_document
                    .as_ref()
                    .and_then(NodeWeakRef::upgrade)
                    .is_some_and(|doc| doc.is_same_node(document));
                record.owner_document = Some(document.downgrade());
                !same
            };
            if moved {
                notify_user_data_handlers(&node, OperationType::NodeAdopted, None);
            }
            if let Some(attributes) = node.attributes() {
                stack.extend(attributes.items());
            }
            if let Some(doctype) = node.as_document_type() {
                stack.extend(doctype.entities().items());
                stack.extend(doctype.notations().items());
            }
            let mut child = node.first_child();
            while let Some(current) = child {
                child = current.next_sibling();
                stack.push(current);
            }
        }
    }

    /// Duplicate this node.
    ///
    /// If `document` is `Some`, the copy belongs to that document,
    /// otherwise to the same document as `self`.
    pub(super) fn duplicate(&self, deep: bool, document: Option<&NodeRef>) -> NodeRef {
        let (node_name, namespace_uri, prefix, local_name, user_data, owner_document) = {
            let record = self.record();
            (
                record.node_name.clone(),
                record.namespace_uri.clone(),
                record.prefix.clone(),
                record.local_name.clone(),
                record.user_data.clone(),
                match document {
                    Some(doc) => Some(doc.clone()),
                    None => record.owner_document.as_ref().and_then(NodeWeakRef::upgrade),
                },
            )
        };

        let attributes = self.attributes().map(|attrs| attrs.items()).unwrap_or_default();
        let (entities, notations) = self
            .as_document_type()
            .map(|doctype| (doctype.entities().items(), doctype.notations().items()))
            .unwrap_or_default();
        let cloned = {
            let record = self.record();
            let data = &record.data;
            let owner = if matches!(data, NodeData::Document(_)) {
                None
            } else {
                owner_document.as_ref()
            };
            NodeRef::create(owner, node_name, namespace_uri, |weak| match data {
                NodeData::Element(_) => NodeData::Element(ElementData::new(weak)),
                NodeData::Attribute(attr) => NodeData::Attribute(attr.duplicate()),
                NodeData::Text(text) => NodeData::Text(text.clone()),
                NodeData::CDATASection(text) => NodeData::CDATASection(text.clone()),
                NodeData::Comment(text) => NodeData::Comment(text.clone()),
                NodeData::ProcessingInstruction(text) => {
                    NodeData::ProcessingInstruction(text.clone())
                }
                NodeData::EntityReference => NodeData::EntityReference,
                NodeData::Entity(entity) => NodeData::Entity(entity.clone()),
                NodeData::Notation(notation) => NodeData::Notation(notation.clone()),
                NodeData::DocumentType(doctype) => {
                    NodeData::DocumentType(doctype.duplicate_identifiers())
                }
                NodeData::DocumentFragment => NodeData::DocumentFragment,
                NodeData::Document(context) => NodeData::Document(context.duplicate()),
            })
        };
        {
            let mut record = cloned.record_mut();
            record.prefix = prefix;
            record.local_name = local_name;
            record.user_data = user_data;
        }

        let child_document = if cloned.node_type() == NodeType::Document {
            Some(cloned.clone())
        } else {
            owner_document
        };
        if let Some(mut map) = cloned.attributes() {
            for attr in attributes {
                map.push_unchecked(attr.duplicate(true, child_document.as_ref()));
            }
        }
        if let Some(doctype) = cloned.as_document_type() {
            let mut map = doctype.entities();
            for entity in entities {
                map.push_unchecked(entity.duplicate(true, child_document.as_ref()));
            }
            let mut map = doctype.notations();
            for notation in notations {
                map.push_unchecked(notation.duplicate(true, child_document.as_ref()));
            }
        }
        if deep {
            let mut child = self.first_child();
            while let Some(current) = child {
                let copy = current.duplicate(true, child_document.as_ref());
                link_before(&cloned, &copy, None);
                child = current.next_sibling();
            }
        }
        cloned
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(record) => write!(f, "{:?}({})", record.data.node_type(), record.node_name),
            Err(_) => write!(f, "NodeRef(<borrowed>)"),
        }
    }
}

/// A non-owning handle to a node.
#[derive(Clone)]
pub struct NodeWeakRef(pub(super) Weak<RefCell<NodeRecord>>);

impl NodeWeakRef {
    pub fn upgrade(&self) -> Option<NodeRef> {
        self.0.upgrade().map(NodeRef)
    }
}

/// Generate a typed handle that wraps [`NodeRef`] for nodes of one kind.
macro_rules! impl_node_handle {
    ($(#[$meta:meta])* $handle:ident, $kind:ident, $conv:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq)]
        pub struct $handle(pub(super) $crate::dom::node::NodeRef);

        impl $crate::dom::node::Node for $handle {
            fn as_node_ref(&self) -> &$crate::dom::node::NodeRef {
                &self.0
            }
        }

        impl From<$handle> for $crate::dom::node::NodeRef {
            fn from(value: $handle) -> Self {
                value.0
            }
        }

        impl std::fmt::Debug for $handle {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }

        impl $crate::dom::node::NodeRef {
            #[doc = concat!("Convert to [`", stringify!($handle), "`] if this is a ", stringify!($kind), " node.")]
            pub fn $conv(&self) -> Option<$handle> {
                ($crate::dom::node::Node::node_type(self) == $crate::dom::NodeType::$kind)
                    .then(|| $handle(self.clone()))
            }
        }
    };
}
pub(crate) use impl_node_handle;

/// Detach `node` from its parent and siblings.\
/// The parent's first/last child are fixed if `node` was an endpoint.
fn unlink(node: &NodeRef) {
    let (parent, prev, next) = {
        let mut record = node.record_mut();
        (
            record.parent_node.take().and_then(|parent| parent.upgrade()),
            record.previous_sibling.take().and_then(|prev| prev.upgrade()),
            record.next_sibling.take(),
        )
    };
    let Some(parent) = parent else {
        return;
    };
    match (prev, next) {
        (Some(prev), Some(next)) => {
            next.record_mut().previous_sibling = Some(prev.downgrade());
            prev.record_mut().next_sibling = Some(next);
        }
        (Some(prev), None) => {
            prev.record_mut().next_sibling = None;
            parent.record_mut().last_child = Some(prev);
        }
        (None, Some(next)) => {
            next.record_mut().previous_sibling = None;
            parent.record_mut().first_child = Some(next);
        }
        (None, None) => {
            let mut record = parent.record_mut();
            record.first_child = None;
            record.last_child = None;
        }
    }
}

/// Link a detached `node` as a child of `parent`, immediately before `reference`,
/// or as the last child if `reference` is `None`.
fn link_before(parent: &NodeRef, node: &NodeRef, reference: Option<&NodeRef>) {
    let prev = match reference {
        Some(reference) => reference.previous_sibling(),
        None => parent.last_child(),
    };
    {
        let mut record = node.record_mut();
        record.parent_node = Some(parent.downgrade());
        record.previous_sibling = prev.as_ref().map(NodeRef::downgrade);
        record.next_sibling = reference.cloned();
    }
    match reference {
        Some(reference) => reference.record_mut().previous_sibling = Some(node.downgrade()),
        None => parent.record_mut().last_child = Some(node.clone()),
    }
    match prev {
        Some(prev) => prev.record_mut().next_sibling = Some(node.clone()),
        None => parent.record_mut().first_child = Some(node.clone()),
    }
}

/// Validate an insertion of `new_child` into `parent` and return the nodes
/// that will actually be linked (the children of a DocumentFragment, or `new_child`).
///
/// `replaced` is the child that is going to be removed by the same operation.
fn check_insertion(
    parent: &NodeRef,
    new_child: &NodeRef,
    ref_child: Option<&NodeRef>,
    replaced: Option<&NodeRef>,
) -> Result<Vec<NodeRef>, DOMException> {
    let nodes = if new_child.node_type() == NodeType::DocumentFragment {
        new_child.child_nodes()
    } else {
        vec![new_child.clone()]
    };

    let parent_type = parent.node_type();
    if nodes
        .iter()
        .any(|node| !check_vertical_hierarchy(parent_type, node.node_type()))
    {
        return Err(DOMException::HierarchyRequestErr);
    }

    for reference in ref_child.into_iter().chain(replaced) {
        if !reference
            .parent_node()
            .is_some_and(|p| p.is_same_node(parent))
        {
            return Err(DOMException::NotFoundErr);
        }
    }

    // `new_child` must not be `parent` itself or one of its ancestors.
    let mut current = Some(parent.clone());
    while let Some(node) = current {
        if node.is_same_node(new_child) {
            return Err(DOMException::HierarchyRequestErr);
        }
        current = node.parent_node();
    }

    if parent_type == NodeType::Document {
        for kind in [NodeType::Element, NodeType::DocumentType] {
            let remaining = parent
                .child_nodes()
                .into_iter()
                .filter(|child| child.node_type() == kind)
                .filter(|child| !replaced.is_some_and(|r| r.is_same_node(child)))
                .filter(|child| !nodes.iter().any(|n| n.is_same_node(child)))
                .count();
            let inserted = nodes.iter().filter(|n| n.node_type() == kind).count();
            if remaining + inserted > 1 {
                return Err(DOMException::HierarchyRequestErr);
            }
        }
    }

    Ok(nodes)
}

/// Detach `nodes` from where they are and link them before `reference`.
/// Nodes from another document are adopted into the document of `parent`.
fn splice(parent: &NodeRef, nodes: &[NodeRef], reference: Option<&NodeRef>) {
    let document = parent.document_node();
    for node in nodes {
        unlink(node);
        if let Some(document) = document.as_ref() {
            if !node
                .document_node()
                .is_some_and(|doc| doc.is_same_node(document))
            {
                node.adopt_subtree(document);
            }
        }
        link_before(parent, node, reference);
    }
}

fn collect_text_content(node: &NodeRef, buf: &mut String) {
    let mut child = node.first_child();
    while let Some(current) = child {
        match current.node_type() {
            NodeType::Comment | NodeType::ProcessingInstruction => {}
            NodeType::Text | NodeType::CDATASection => {
                if let Some(data) = current.character_data() {
                    buf.push_str(&data);
                }
            }
            _ => collect_text_content(&current, buf),
        }
        child = current.next_sibling();
    }
}

/// Path from the root of the tree down to `node`.\
/// The container of an Attribute is its owner element.
fn path_from_root(node: &NodeRef) -> Vec<NodeRef> {
    let mut path = vec![node.clone()];
    let mut current = node.container();
    while let Some(ancestor) = current {
        current = ancestor.container();
        path.push(ancestor);
    }
    path.reverse();
    path
}

/// Implementation of [Interface Node](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1950641247).
///
/// Every handle type implements this trait by providing [`Node::as_node_ref`].
pub trait Node {
    /// The underlying untyped handle.
    fn as_node_ref(&self) -> &NodeRef;

    /// Implementation of [`nodeName`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-F68D095) attribute.
    fn node_name(&self) -> Rc<str> {
        self.as_node_ref().record().node_name.clone()
    }

    /// Implementation of [`nodeValue`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-F68D080) attribute.
    ///
    /// # Specification
    /// ```text
    /// The value of this node, depending on its type; see the table above. When it is
    /// defined to be null, setting it has no effect, including if the node is read-only.
    /// ```
    fn node_value(&self) -> Option<String> {
        let record = self.as_node_ref().record();
        match &record.data {
            NodeData::Attribute(attr) => Some(attr.value.clone()),
            data => data.character_data().cloned(),
        }
    }

    /// Set the value of Attribute, Text, CDATASection, Comment and ProcessingInstruction
    /// nodes. No effect on other kinds.
    fn set_node_value(&mut self, value: impl Into<String>) -> Result<(), DOMException> {
        let mut record = self.as_node_ref().record_mut();
        match &mut record.data {
            NodeData::Attribute(attr) => attr.value = value.into(),
            data => {
                if let Some(text) = data.character_data_mut() {
                    *text = value.into();
                }
            }
        }
        Ok(())
    }

    /// Implementation of [`nodeType`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-111237558) attribute.
    fn node_type(&self) -> NodeType {
        self.as_node_ref().record().data.node_type()
    }

    /// Implementation of [`parentNode`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1060184317) attribute.
    ///
    /// Attribute, Document, DocumentFragment, Entity and Notation nodes never have a parent.
    fn parent_node(&self) -> Option<NodeRef> {
        self.as_node_ref()
            .record()
            .parent_node
            .as_ref()
            .and_then(NodeWeakRef::upgrade)
    }

    /// Snapshot of the children in document order.
    fn child_nodes(&self) -> Vec<NodeRef> {
        let mut children = vec![];
        let mut child = self.first_child();
        while let Some(current) = child {
            child = current.next_sibling();
            children.push(current);
        }
        children
    }

    fn first_child(&self) -> Option<NodeRef> {
        self.as_node_ref().record().first_child.clone()
    }

    fn last_child(&self) -> Option<NodeRef> {
        self.as_node_ref().record().last_child.clone()
    }

    fn previous_sibling(&self) -> Option<NodeRef> {
        self.as_node_ref()
            .record()
            .previous_sibling
            .as_ref()
            .and_then(NodeWeakRef::upgrade)
    }

    fn next_sibling(&self) -> Option<NodeRef> {
        self.as_node_ref().record().next_sibling.clone()
    }

    /// The attribute map of an Element. `None` for other kinds.
    fn attributes(&self) -> Option<NamedNodeMap> {
        match &self.as_node_ref().record().data {
            NodeData::Element(element) => Some(element.attributes.clone()),
            _ => None,
        }
    }

    /// Implementation of [`ownerDocument`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-node-ownerDoc) attribute.
    ///
    /// # Specification
    /// ```text
    /// The Document object associated with this node. This is also the Document object
    /// used to create new nodes. When this node is a Document or a DocumentType which
    /// is not used with any Document yet, this is null.
    /// ```
    fn owner_document(&self) -> Option<DocumentRef> {
        let node = self.as_node_ref();
        if node.node_type() == NodeType::Document {
            return None;
        }
        node.document_node().and_then(|doc| doc.as_document())
    }

    /// Implementation of [`insertBefore`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-952280727) method.
    ///
    /// If `ref_child` is `None`, `new_child` is appended.\
    /// If `new_child` is a DocumentFragment, its children are moved in order.\
    /// If `new_child` is already in the tree, it is first removed.\
    /// If `new_child` belongs to another document, it is adopted.
    ///
    /// The tree is left unmodified if an error is returned.
    ///
    /// # Errors
    /// - `HierarchyRequestErr`: `new_child` is not allowed as a child of this node,
    ///   is this node or one of its ancestors, or would give a Document a second
    ///   Element or DocumentType.
    /// - `NotFoundErr`: `ref_child` is not a child of this node.
    fn insert_before(
        &mut self,
        new_child: NodeRef,
        ref_child: Option<NodeRef>,
    ) -> Result<NodeRef, DOMException> {
        let parent = self.as_node_ref();
        if ref_child
            .as_ref()
            .is_some_and(|r| r.is_same_node(&new_child))
        {
            let is_child = new_child
                .parent_node()
                .is_some_and(|p| p.is_same_node(parent));
            return if is_child {
                Ok(new_child)
            } else {
                Err(DOMException::NotFoundErr)
            };
        }
        let nodes = check_insertion(parent, &new_child, ref_child.as_ref(), None)?;
        splice(parent, &nodes, ref_child.as_ref());
        Ok(new_child)
    }

    /// Implementation of [`replaceChild`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-785887307) method.
    ///
    /// Return the replaced node.
    ///
    /// # Errors
    /// - `HierarchyRequestErr`: same conditions as [`Node::insert_before`].
    /// - `NotFoundErr`: `old_child` is not a child of this node.
    fn replace_child(
        &mut self,
        new_child: NodeRef,
        old_child: NodeRef,
    ) -> Result<NodeRef, DOMException> {
        let parent = self.as_node_ref();
        let nodes = check_insertion(parent, &new_child, None, Some(&old_child))?;
        if new_child.is_same_node(&old_child) {
            return Ok(old_child);
        }

        let mut anchor = old_child.next_sibling();
        if anchor.as_ref().is_some_and(|a| a.is_same_node(&new_child)) {
            anchor = new_child.next_sibling();
        }
        unlink(&old_child);
        splice(parent, &nodes, anchor.as_ref());
        Ok(old_child)
    }

    /// Implementation of [`removeChild`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1734834066) method.
    ///
    /// The removed node keeps its own subtree.
    ///
    /// # Errors
    /// - `NotFoundErr`: `old_child` is not a child of this node.
    fn remove_child(&mut self, old_child: NodeRef) -> Result<NodeRef, DOMException> {
        let parent = self.as_node_ref();
        if !old_child
            .parent_node()
            .is_some_and(|p| p.is_same_node(parent))
        {
            return Err(DOMException::NotFoundErr);
        }
        unlink(&old_child);
        Ok(old_child)
    }

    /// Implementation of [`appendChild`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-184E7107) method.
    fn append_child(&mut self, new_child: NodeRef) -> Result<NodeRef, DOMException> {
        self.insert_before(new_child, None)
    }

    fn has_child_nodes(&self) -> bool {
        self.as_node_ref().record().first_child.is_some()
    }

    /// Implementation of [`cloneNode`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-3A0ED0A4) method.
    ///
    /// The copy has no parent. Attributes of an Element are always copied.
    /// A shallow copy has no children.
    ///
    /// User data is copied, and handlers are called with [`OperationType::NodeCloned`].
    /// Cloning a Document starts a new synthetic-prefix counter.
    fn clone_node(&self, deep: bool) -> NodeRef {
        let node = self.as_node_ref();
        let cloned = node.duplicate(deep, None);
        notify_user_data_handlers(node, OperationType::NodeCloned, Some(&cloned));
        cloned
    }

    /// Implementation of [`normalize`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-normalize) method.
    ///
    /// Adjacent Text nodes are merged into the first one and empty Text nodes are
    /// removed, through the full depth of the subtree. CDATASection nodes are kept.
    fn normalize(&mut self) {
        let mut child = self.first_child();
        while let Some(mut current) = child {
            if current.node_type() == NodeType::Text {
                while let Some(next) = current
                    .next_sibling()
                    .filter(|next| next.node_type() == NodeType::Text)
                {
                    let text = next.character_data().unwrap_or_default();
                    current.with_character_data_mut(|data| data.push_str(&text));
                    unlink(&next);
                }
                child = current.next_sibling();
                if current
                    .character_data()
                    .is_some_and(|data| data.is_empty())
                {
                    unlink(&current);
                }
            } else {
                if current.has_child_nodes() {
                    current.normalize();
                }
                child = current.next_sibling();
            }
        }
    }

    /// Implementation of [`isSupported`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-Level-2-Core-Node-supports) method.
    fn is_supported(&self, feature: &str, version: Option<&str>) -> bool {
        DOMImplementation.has_feature(feature, version)
    }

    fn namespace_uri(&self) -> Option<Rc<str>> {
        self.as_node_ref().record().namespace_uri.clone()
    }

    fn prefix(&self) -> Option<Rc<str>> {
        self.as_node_ref().record().prefix.clone()
    }

    /// Implementation of [`prefix`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-NodeNSPrefix) attribute setter.
    ///
    /// Only Element and Attribute nodes are affected.
    ///
    /// # Errors
    /// - `InvalidCharacterErr`: `prefix` is not an NCName.
    /// - `NamespaceErr`: the node has no namespace URI, `prefix` is `xml` and the
    ///   namespace is not the XML namespace, or this is an attribute and `prefix`
    ///   is `xmlns` with another namespace than the xmlns namespace, or the attribute
    ///   is named `xmlns`.
    fn set_prefix(&mut self, prefix: Option<&str>) -> Result<(), DOMException> {
        let node = self.as_node_ref();
        let node_type = node.node_type();
        if !matches!(node_type, NodeType::Element | NodeType::Attribute) {
            return Ok(());
        }
        let prefix = prefix.filter(|p| !p.is_empty());
        if let Some(prefix) = prefix {
            validate_ncname(prefix).map_err(|_| DOMException::InvalidCharacterErr)?;
            let namespace_uri = node.namespace_uri();
            let Some(namespace_uri) = namespace_uri.as_deref() else {
                return Err(DOMException::NamespaceErr);
            };
            if prefix == "xml" && namespace_uri != XML_XML_NAMESPACE {
                return Err(DOMException::NamespaceErr);
            }
            if node_type == NodeType::Attribute
                && ((prefix == "xmlns" && namespace_uri != XML_NS_NAMESPACE)
                    || node.node_name().as_ref() == "xmlns")
            {
                return Err(DOMException::NamespaceErr);
            }
        }
        node.set_prefix_unchecked(prefix.map(Rc::from));
        Ok(())
    }

    fn local_name(&self) -> Option<Rc<str>> {
        self.as_node_ref().record().local_name.clone()
    }

    fn has_attributes(&self) -> bool {
        self.attributes().is_some_and(|attrs| !attrs.is_empty())
    }

    /// Implementation of [`compareDocumentPosition`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Node3-compareDocumentPosition) method.
    ///
    /// The flags describe `other` relative to this node.
    /// Attributes are placed after their owner element and before its children.
    fn compare_document_position(&self, other: &impl Node) -> DocumentPosition {
        let this = self.as_node_ref();
        let other = other.as_node_ref();
        if this.is_same_node(other) {
            return DocumentPosition::new();
        }

        let this_path = path_from_root(this);
        let other_path = path_from_root(other);
        if !this_path[0].is_same_node(&other_path[0]) {
            let order = if Rc::as_ptr(&this_path[0].0) < Rc::as_ptr(&other_path[0].0) {
                DOCUMENT_POSITION_FOLLOWING
            } else {
                DOCUMENT_POSITION_PRECEDING
            };
            return DocumentPosition::new()
                .set_flag(DOCUMENT_POSITION_DISCONNECTED)
                .set_flag(DOCUMENT_POSITION_IMPLEMENTATION_SPECIFIC)
                .set_flag(order);
        }

        let common = this_path
            .iter()
            .zip(&other_path)
            .take_while(|(l, r)| l.is_same_node(*r))
            .count();
        if common == this_path.len() {
            return DocumentPosition::new()
                .set_flag(DOCUMENT_POSITION_CONTAINED_BY)
                .set_flag(DOCUMENT_POSITION_FOLLOWING);
        }
        if common == other_path.len() {
            return DocumentPosition::new()
                .set_flag(DOCUMENT_POSITION_CONTAINS)
                .set_flag(DOCUMENT_POSITION_PRECEDING);
        }

        let (l, r) = (&this_path[common], &other_path[common]);
        let following = match (
            l.node_type() == NodeType::Attribute,
            r.node_type() == NodeType::Attribute,
        ) {
            (true, true) => {
                let attrs = this_path[common - 1].attributes();
                let index = |attr: &NodeRef| attrs.as_ref().and_then(|a| a.index_of(attr));
                return DocumentPosition::new()
                    .set_flag(DOCUMENT_POSITION_IMPLEMENTATION_SPECIFIC)
                    .set_flag(if index(l) < index(r) {
                        DOCUMENT_POSITION_FOLLOWING
                    } else {
                        DOCUMENT_POSITION_PRECEDING
                    });
            }
            (true, false) => true,
            (false, true) => false,
            (false, false) => {
                let mut sibling = l.next_sibling();
                loop {
                    match sibling {
                        Some(node) if node.is_same_node(r) => break true,
                        Some(node) => sibling = node.next_sibling(),
                        None => break false,
                    }
                }
            }
        };
        DocumentPosition::new().set_flag(if following {
            DOCUMENT_POSITION_FOLLOWING
        } else {
            DOCUMENT_POSITION_PRECEDING
        })
    }

    /// Implementation of [`textContent`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Node3-textContent) attribute.
    fn text_content(&self) -> Option<String> {
        let node = self.as_node_ref();
        match node.node_type() {
            NodeType::Document | NodeType::DocumentType | NodeType::Notation => None,
            NodeType::Text
            | NodeType::CDATASection
            | NodeType::Comment
            | NodeType::ProcessingInstruction
            | NodeType::Attribute => node.node_value(),
            _ => {
                let mut buf = String::new();
                collect_text_content(node, &mut buf);
                Some(buf)
            }
        }
    }

    /// Replace all children by a single Text node holding `text`,
    /// or set the value of nodes holding character data.
    fn set_text_content(&mut self, text: &str) {
        let node = self.as_node_ref();
        match node.node_type() {
            NodeType::Document | NodeType::DocumentType | NodeType::Notation => {}
            NodeType::Text
            | NodeType::CDATASection
            | NodeType::Comment
            | NodeType::ProcessingInstruction
            | NodeType::Attribute => {
                let _ = node.clone().set_node_value(text);
            }
            _ => {
                while let Some(child) = node.first_child() {
                    unlink(&child);
                }
                if !text.is_empty() {
                    let document = node.document_node();
                    let text =
                        NodeRef::create(document.as_ref(), "#text".into(), None, |_| {
                            NodeData::Text(text.to_owned())
                        });
                    link_before(node, &text, None);
                }
            }
        }
    }

    fn is_same_node(&self, other: &impl Node) -> bool {
        Rc::ptr_eq(&self.as_node_ref().0, &other.as_node_ref().0)
    }

    /// Implementation of [`lookupPrefix`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Node3-lookupNamespacePrefix) method.
    ///
    /// A candidate prefix is returned only if it still resolves to `namespace_uri`
    /// from the element the lookup started from.
    fn lookup_prefix(&self, namespace_uri: &str) -> Option<Rc<str>> {
        if namespace_uri.is_empty() {
            return None;
        }
        let node = self.as_node_ref();
        match node.node_type() {
            NodeType::Element => node
                .as_element()?
                .lookup_namespace_prefix(namespace_uri, &node.as_element()?),
            NodeType::Document => node
                .as_document()?
                .document_element()?
                .lookup_prefix(namespace_uri),
            NodeType::Entity
            | NodeType::Notation
            | NodeType::DocumentType
            | NodeType::DocumentFragment => None,
            NodeType::Attribute => node
                .as_attribute()?
                .owner_element()?
                .lookup_prefix(namespace_uri),
            _ => node.ancestor_element()?.lookup_prefix(namespace_uri),
        }
    }

    /// Implementation of [`isDefaultNamespace`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Node3-isDefaultNamespace) method.
    ///
    /// `None` and the empty string both mean "no namespace".
    fn is_default_namespace(&self, namespace_uri: Option<&str>) -> bool {
        let namespace_uri = namespace_uri.filter(|uri| !uri.is_empty());
        let node = self.as_node_ref();
        match node.node_type() {
            NodeType::Element => node
                .as_element()
                .is_some_and(|elem| elem.is_default_namespace_in_scope(namespace_uri)),
            NodeType::Document => node
                .as_document()
                .and_then(|doc| doc.document_element())
                .is_some_and(|elem| elem.is_default_namespace(namespace_uri)),
            NodeType::Entity
            | NodeType::Notation
            | NodeType::DocumentType
            | NodeType::DocumentFragment => false,
            NodeType::Attribute => node
                .as_attribute()
                .and_then(|attr| attr.owner_element())
                .is_some_and(|elem| elem.is_default_namespace(namespace_uri)),
            _ => node
                .ancestor_element()
                .is_some_and(|elem| elem.is_default_namespace(namespace_uri)),
        }
    }

    /// Implementation of [`lookupNamespaceURI`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Node3-lookupNamespaceURI) method.
    ///
    /// `None` and the empty string both look up the default namespace.
    fn lookup_namespace_uri(&self, prefix: Option<&str>) -> Option<Rc<str>> {
        let prefix = prefix.filter(|p| !p.is_empty());
        let node = self.as_node_ref();
        match node.node_type() {
            NodeType::Element => node.as_element()?.namespace_uri_in_scope(prefix),
            NodeType::Document => node
                .as_document()?
                .document_element()?
                .lookup_namespace_uri(prefix),
            NodeType::Entity
            | NodeType::Notation
            | NodeType::DocumentType
            | NodeType::DocumentFragment => None,
            NodeType::Attribute => node
                .as_attribute()?
                .owner_element()?
                .lookup_namespace_uri(prefix),
            _ => node.ancestor_element()?.lookup_namespace_uri(prefix),
        }
    }

    /// Implementation of [`isEqualNode`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Node3-isEqualNode) method.
    ///
    /// Attributes are compared regardless of their order, children in order.
    fn is_equal_node(&self, other: &impl Node) -> bool {
        let (l, r) = (self.as_node_ref(), other.as_node_ref());
        if l.is_same_node(r) {
            return true;
        }
        if l.node_type() != r.node_type()
            || l.node_name() != r.node_name()
            || l.local_name() != r.local_name()
            || l.namespace_uri() != r.namespace_uri()
            || l.prefix() != r.prefix()
            || l.node_value() != r.node_value()
        {
            return false;
        }

        match (l.attributes(), r.attributes()) {
            (Some(lattrs), Some(rattrs)) => {
                if lattrs.len() != rattrs.len() {
                    return false;
                }
                for attr in lattrs.items() {
                    let found = match (attr.namespace_uri(), attr.local_name()) {
                        (Some(ns), Some(local)) => rattrs.get_named_item_ns(Some(ns.as_ref()), &local),
                        _ => rattrs.get_named_item(&attr.node_name()),
                    };
                    if !found.is_some_and(|found| attr.is_equal_node(&found)) {
                        return false;
                    }
                }
            }
            (None, None) => {}
            _ => return false,
        }

        if let (Some(ldoctype), Some(rdoctype)) = (l.as_document_type(), r.as_document_type()) {
            if !ldoctype.has_same_identifiers(&rdoctype) {
                return false;
            }
        }

        let (lchildren, rchildren) = (l.child_nodes(), r.child_nodes());
        lchildren.len() == rchildren.len()
            && lchildren
                .iter()
                .zip(&rchildren)
                .all(|(l, r)| l.is_equal_node(r))
    }

    /// Implementation of [`setUserData`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Node3-setUserData) method.
    ///
    /// Passing `None` as `data` removes the entry. Return the previous value.
    fn set_user_data(
        &mut self,
        key: impl Into<String>,
        data: Option<DOMUserData>,
        handler: Option<Rc<dyn UserDataHandler>>,
    ) -> Option<DOMUserData> {
        let mut record = self.as_node_ref().record_mut();
        let key = key.into();
        match data {
            Some(data) => record
                .user_data
                .get_or_insert_with(HashMap::new)
                .insert(key, (data, handler))
                .map(|old| old.0),
            None => record
                .user_data
                .as_mut()
                .and_then(|table| table.remove(&key))
                .map(|old| old.0),
        }
    }

    /// Implementation of [`getUserData`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Node3-getUserData) method.
    fn get_user_data(&self, key: &str) -> Option<DOMUserData> {
        self.as_node_ref()
            .record()
            .user_data
            .as_ref()
            .and_then(|table| table.get(key))
            .map(|entry| entry.0.clone())
    }
}

impl Node for NodeRef {
    fn as_node_ref(&self) -> &NodeRef {
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::{character_data::CharacterData, document::DocumentRef};

    use super::*;

    fn texts(doc: &DocumentRef, parent: &mut impl Node, values: &[&str]) -> Vec<NodeRef> {
        values
            .iter()
            .map(|value| {
                let text: NodeRef = doc.create_text_node(value).into();
                parent.append_child(text.clone()).unwrap();
                text
            })
            .collect()
    }

    fn names(node: &impl Node) -> Vec<String> {
        node.child_nodes()
            .iter()
            .map(|child| child.node_name().to_string())
            .collect()
    }

    #[test]
    fn insert_before_test() {
        let doc = DocumentRef::new(None, Some("root"), None).unwrap();
        let mut root = doc.document_element().unwrap();
        let a: NodeRef = doc.create_element("a").unwrap().into();
        let b: NodeRef = doc.create_element("b").unwrap().into();
        let c: NodeRef = doc.create_element("c").unwrap().into();
        root.append_child(a.clone()).unwrap();
        root.append_child(c.clone()).unwrap();

        root.insert_before(b.clone(), Some(c.clone())).unwrap();
        assert_eq!(names(&root), ["a", "b", "c"]);
        assert_eq!(b.previous_sibling(), Some(a.clone()));
        assert_eq!(b.next_sibling(), Some(c.clone()));
        assert_eq!(b.parent_node(), Some(NodeRef::from(root.clone())));

        // inserting before itself is a no-op
        root.insert_before(b.clone(), Some(b.clone())).unwrap();
        assert_eq!(names(&root), ["a", "b", "c"]);

        // ... but only for a child of this node
        let mut other = doc.create_element("other").unwrap();
        let x: NodeRef = doc.create_element("x").unwrap().into();
        other.append_child(x.clone()).unwrap();
        assert_eq!(
            root.insert_before(x.clone(), Some(x.clone())),
            Err(DOMException::NotFoundErr)
        );
        assert_eq!(x.parent_node(), Some(NodeRef::from(other)));
        let detached: NodeRef = doc.create_element("detached").unwrap().into();
        assert_eq!(
            root.insert_before(detached.clone(), Some(detached)),
            Err(DOMException::NotFoundErr)
        );
        assert_eq!(names(&root), ["a", "b", "c"]);

        // moving an existing child
        root.insert_before(c.clone(), Some(a.clone())).unwrap();
        assert_eq!(names(&root), ["c", "a", "b"]);
        assert_eq!(root.first_child(), Some(c.clone()));
        assert_eq!(root.last_child(), Some(b.clone()));
        assert_eq!(a.previous_sibling(), Some(c));
        assert!(b.next_sibling().is_none());
    }

    #[test]
    fn insert_before_errors_test() {
        let doc = DocumentRef::new(None, Some("root"), None).unwrap();
        let mut root = doc.document_element().unwrap();
        let mut child = doc.create_element("child").unwrap();
        root.append_child(child.clone().into()).unwrap();
        let stranger: NodeRef = doc.create_element("stranger").unwrap().into();
        let new: NodeRef = doc.create_element("new").unwrap().into();

        assert_eq!(
            root.insert_before(new.clone(), Some(stranger)),
            Err(DOMException::NotFoundErr)
        );
        assert!(new.parent_node().is_none());

        // an ancestor cannot become a descendant
        assert_eq!(
            child.append_child(root.clone().into()),
            Err(DOMException::HierarchyRequestErr)
        );
        assert_eq!(
            child.append_child(child.clone().into()),
            Err(DOMException::HierarchyRequestErr)
        );
        assert_eq!(names(&root), ["child"]);

        // text never has children
        let mut text = doc.create_text_node("t");
        assert_eq!(
            text.append_child(new.clone()),
            Err(DOMException::HierarchyRequestErr)
        );

        // attributes are not children
        let attr = doc.create_attribute("a").unwrap();
        assert_eq!(
            root.append_child(attr.into()),
            Err(DOMException::HierarchyRequestErr)
        );

        // only one document element
        let mut document = doc.clone();
        assert_eq!(
            document.append_child(new),
            Err(DOMException::HierarchyRequestErr)
        );
    }

    #[test]
    fn remove_child_test() {
        let doc = DocumentRef::new(None, Some("root"), None).unwrap();
        let mut root = doc.document_element().unwrap();
        let only: NodeRef = doc.create_element("only").unwrap().into();
        root.append_child(only.clone()).unwrap();

        let removed = root.remove_child(only.clone()).unwrap();
        assert_eq!(removed, only);
        assert!(root.first_child().is_none());
        assert!(root.last_child().is_none());
        assert!(only.parent_node().is_none());
        assert_eq!(
            root.remove_child(only.clone()),
            Err(DOMException::NotFoundErr)
        );

        let nodes = texts(&doc, &mut root, &["x", "y", "z"]);
        root.remove_child(nodes[2].clone()).unwrap();
        assert_eq!(root.last_child(), Some(nodes[1].clone()));
        assert!(nodes[1].next_sibling().is_none());
        root.remove_child(nodes[0].clone()).unwrap();
        assert_eq!(root.first_child(), Some(nodes[1].clone()));
        assert!(nodes[1].previous_sibling().is_none());

        // the removed node keeps its subtree
        let mut parent = doc.create_element("parent").unwrap();
        parent
            .append_child(doc.create_comment("kept").into())
            .unwrap();
        root.append_child(parent.clone().into()).unwrap();
        let parent = root.remove_child(parent.into()).unwrap();
        assert_eq!(names(&parent), ["#comment"]);
    }

    #[test]
    fn replace_child_test() {
        let doc = DocumentRef::new(None, Some("root"), None).unwrap();
        let mut root = doc.document_element().unwrap();
        let nodes = texts(&doc, &mut root, &["a", "b", "c"]);
        let new: NodeRef = doc.create_element("new").unwrap().into();

        let old = root.replace_child(new.clone(), nodes[1].clone()).unwrap();
        assert_eq!(old, nodes[1]);
        assert!(old.parent_node().is_none());
        assert_eq!(names(&root), ["#text", "new", "#text"]);
        assert_eq!(nodes[0].next_sibling(), Some(new.clone()));
        assert_eq!(nodes[2].previous_sibling(), Some(new.clone()));

        // replacing an endpoint with its own next sibling
        root.replace_child(new.clone(), nodes[0].clone()).unwrap();
        assert_eq!(names(&root), ["new", "#text"]);
        assert_eq!(root.first_child(), Some(new.clone()));
        assert_eq!(root.last_child(), Some(nodes[2].clone()));

        assert_eq!(
            root.replace_child(nodes[0].clone(), nodes[1].clone()),
            Err(DOMException::NotFoundErr)
        );
    }

    #[test]
    fn document_fragment_insertion_test() {
        let doc = DocumentRef::new(None, Some("root"), None).unwrap();
        let mut root = doc.document_element().unwrap();
        let last = texts(&doc, &mut root, &["last"]);
        let mut fragment = doc.create_document_fragment();
        fragment
            .append_child(doc.create_element("x").unwrap().into())
            .unwrap();
        fragment
            .append_child(doc.create_element("y").unwrap().into())
            .unwrap();

        root.insert_before(fragment.clone().into(), Some(last[0].clone()))
            .unwrap();
        assert_eq!(names(&root), ["x", "y", "#text"]);
        assert!(!fragment.has_child_nodes());
    }

    #[test]
    fn normalize_test() {
        let doc = DocumentRef::new(None, Some("root"), None).unwrap();
        let mut root = doc.document_element().unwrap();
        texts(&doc, &mut root, &["a", "", "b", "c"]);
        root.normalize();
        let children = root.child_nodes();
        assert_eq!(children.len(), 1);
        assert_eq!(children[0].node_value().as_deref(), Some("abc"));

        // empty text is removed, CDATA is kept, nested elements are normalized
        let mut root = doc.create_element("r").unwrap();
        texts(&doc, &mut root, &[""]);
        root.append_child(doc.create_cdata_section("c").into())
            .unwrap();
        let mut inner = doc.create_element("inner").unwrap();
        texts(&doc, &mut inner, &["1", "2"]);
        root.append_child(inner.clone().into()).unwrap();
        root.normalize();
        assert_eq!(names(&root), ["#cdata-section", "inner"]);
        assert_eq!(inner.text_content().as_deref(), Some("12"));
        assert_eq!(inner.child_nodes().len(), 1);
    }

    #[test]
    fn clone_node_test() {
        let doc = DocumentRef::new(None, Some("root"), None).unwrap();
        let mut root = doc.document_element().unwrap();
        root.set_attribute("id", "r").unwrap();
        texts(&doc, &mut root, &["hello"]);

        let shallow = root.clone_node(false);
        assert!(shallow.first_child().is_none());
        assert!(shallow.last_child().is_none());
        assert!(shallow.parent_node().is_none());
        let shallow = shallow.as_element().unwrap();
        assert_eq!(shallow.get_attribute("id").as_deref(), Some("r"));
        // attributes are copied, not shared
        let attr = shallow.get_attribute_node("id").unwrap();
        assert_eq!(attr.owner_element(), Some(shallow.clone()));

        let deep = root.clone_node(true);
        assert!(deep.is_equal_node(&root));
        assert_eq!(deep.text_content().as_deref(), Some("hello"));
        assert_ne!(deep.first_child(), root.first_child());
        assert_eq!(deep.owner_document(), Some(doc.clone()));
    }

    #[test]
    fn text_content_test() {
        let doc = DocumentRef::new(None, Some("root"), None).unwrap();
        let mut root = doc.document_element().unwrap();
        texts(&doc, &mut root, &["a"]);
        root.append_child(doc.create_comment("ignored").into())
            .unwrap();
        let mut b = doc.create_element("b").unwrap();
        b.append_child(doc.create_cdata_section("c").into())
            .unwrap();
        root.append_child(b.into()).unwrap();
        assert_eq!(root.text_content().as_deref(), Some("ac"));
        assert_eq!(doc.text_content(), None);

        root.set_text_content("replaced");
        assert_eq!(root.child_nodes().len(), 1);
        assert_eq!(root.text_content().as_deref(), Some("replaced"));
        let text = root.first_child().unwrap().as_text_node().unwrap();
        assert_eq!(text.data(), "replaced");
    }

    #[test]
    fn compare_document_position_test() {
        let doc = DocumentRef::new(None, Some("root"), None).unwrap();
        let mut root = doc.document_element().unwrap();
        let nodes = texts(&doc, &mut root, &["a", "b"]);

        let pos = nodes[0].compare_document_position(&nodes[1]);
        assert!(pos.is_following());
        assert!(!pos.is_preceding());
        let pos = nodes[1].compare_document_position(&nodes[0]);
        assert!(pos.is_preceding());

        let pos = root.compare_document_position(&nodes[0]);
        assert!(pos.is_contained_by() && pos.is_following());
        let pos = nodes[0].compare_document_position(&root);
        assert!(pos.is_contains() && pos.is_preceding());

        assert!(root.compare_document_position(&root).is_same_node());

        let detached = doc.create_element("detached").unwrap();
        let pos = root.compare_document_position(&detached);
        assert!(pos.is_disconnected() && pos.is_implementation_specific());

        root.set_attribute("x", "1").unwrap();
        let attr = root.get_attribute_node("x").unwrap();
        assert!(attr.compare_document_position(&nodes[0]).is_following());
        assert!(root.compare_document_position(&attr).is_contained_by());
    }
}
