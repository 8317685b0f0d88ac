use std::rc::Rc;

use crate::qname::{split_prefix_local, validate_name};

use super::{
    DOMException, check_qualified_name,
    attr::AttrRef,
    binding_scope::BindingScope,
    named_node_map::NamedNodeMap,
    node::{Node, NodeData, NodeRef, NodeWeakRef, impl_node_handle},
};

/// Payload of an Element node.
pub(crate) struct ElementData {
    pub(super) attributes: NamedNodeMap,
    /// Bindings declared by this element, refreshed by namespace normalization.
    pub(super) bindings: BindingScope,
}

impl ElementData {
    pub(super) fn new(this: &NodeWeakRef) -> Self {
        Self {
            attributes: NamedNodeMap::attributes(this),
            bindings: BindingScope::new(),
        }
    }
}

impl_node_handle!(
    /// Implementation of [Element](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-745549614)
    /// interface on [1.4 Fundamental Interfaces: Core Module](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-BBACDC08)
    ElementRef,
    Element,
    as_element
);

impl ElementRef {
    pub(super) fn create(
        owner_document: Option<&NodeRef>,
        qualified_name: Rc<str>,
        namespace_uri: Option<Rc<str>>,
    ) -> Self {
        ElementRef(NodeRef::create(
            owner_document,
            qualified_name,
            namespace_uri,
            |this| NodeData::Element(ElementData::new(this)),
        ))
    }

    fn attribute_map(&self) -> NamedNodeMap {
        match &self.0.record().data {
            NodeData::Element(data) => data.attributes.clone(),
            _ => unreachable!("ElementRef always wraps an Element node"),
        }
    }

    /// Implementation of `tagName` attribute.\
    /// Same as `nodeName`.
    pub fn tag_name(&self) -> Rc<str> {
        self.node_name()
    }

    /// Implementation of [`getAttribute`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-666EE0F9) method.
    ///
    /// Return `None` if the attribute is not present.
    pub fn get_attribute(&self, name: &str) -> Option<String> {
        self.get_attribute_node(name).map(|attr| attr.value())
    }

    /// Implementation of [`setAttribute`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-F68F082) method.
    ///
    /// # Specification
    /// ```text
    /// Adds a new attribute. If an attribute with that name is already present in the
    /// element, its value is changed to be that of the value parameter. This value is
    /// a simple string; it is not parsed as it is being set.
    ///
    /// Exceptions
    ///     DOMException
    ///     INVALID_CHARACTER_ERR:       Raised if the specified name is not an XML name
    ///                                  according to the XML version in use specified in
    ///                                  the Document.xmlVersion attribute.
    /// ```
    pub fn set_attribute(
        &mut self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), DOMException> {
        if validate_name(name).is_err() {
            return Err(DOMException::InvalidCharacterErr);
        }

        if let Some(mut attr) = self.get_attribute_node(name) {
            attr.set_value(value);
            return Ok(());
        }
        let document = self.0.document_node();
        let attr = AttrRef::create(document.as_ref(), name.into(), None, value);
        self.attribute_map().push_unchecked(attr.into());
        Ok(())
    }

    /// Implementation of [`removeAttribute`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-6D6AC0F9) method.
    ///
    /// If no attribute with this name is found, this method has no effect.
    pub fn remove_attribute(&mut self, name: &str) {
        if let Some(attr) = self.attribute_map().remove_named_item(name) {
            self.forget_id(&attr);
        }
    }

    /// Implementation of [`getAttributeNode`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-217A91B8) method.
    pub fn get_attribute_node(&self, name: &str) -> Option<AttrRef> {
        self.attribute_map()
            .get_named_item(name)
            .and_then(|attr| attr.as_attribute())
    }

    /// Implementation of [`setAttributeNode`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-887236154) method.
    ///
    /// Return the attribute replaced by `new_attr`, if any.
    ///
    /// # Errors
    /// - `WrongDocumentErr`: `new_attr` was created from a different document.
    /// - `InuseAttributeErr`: `new_attr` is already an attribute of another element.
    pub fn set_attribute_node(&mut self, new_attr: AttrRef) -> Result<Option<AttrRef>, DOMException> {
        let replaced = self.attribute_map().set_named_item(new_attr.clone().into())?;
        Ok(self.replaced_attribute(replaced, &new_attr))
    }

    /// Implementation of [`setAttributeNodeNS`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-ElSetAtNodeNS) method.
    ///
    /// Same as [`ElementRef::set_attribute_node`], but keyed by namespace URI and local name.
    pub fn set_attribute_node_ns(
        &mut self,
        new_attr: AttrRef,
    ) -> Result<Option<AttrRef>, DOMException> {
        let replaced = self
            .attribute_map()
            .set_named_item_ns(new_attr.clone().into())?;
        Ok(self.replaced_attribute(replaced, &new_attr))
    }

    fn replaced_attribute(&self, replaced: Option<NodeRef>, new_attr: &AttrRef) -> Option<AttrRef> {
        let replaced = replaced
            .filter(|old| !old.is_same_node(new_attr))
            .and_then(|old| old.as_attribute())?;
        self.forget_id(&replaced.clone().into());
        Some(replaced)
    }

    /// Implementation of [`removeAttributeNode`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-D589198) method.
    ///
    /// # Errors
    /// - `NotFoundErr`: `old_attr` is not an attribute of this element.
    pub fn remove_attribute_node(&mut self, old_attr: AttrRef) -> Result<AttrRef, DOMException> {
        let removed = self
            .attribute_map()
            .remove_node(old_attr.as_node_ref())
            .ok_or(DOMException::NotFoundErr)?;
        self.forget_id(&removed);
        Ok(old_attr)
    }

    /// Implementation of [`getAttributeNS`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-ElGetAttrNS) method.
    pub fn get_attribute_ns(&self, namespace_uri: Option<&str>, local_name: &str) -> Option<String> {
        self.get_attribute_node_ns(namespace_uri, local_name)
            .map(|attr| attr.value())
    }

    /// Implementation of [`setAttributeNS`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-ElSetAttrNS) method.
    ///
    /// # Specification
    /// ```text
    /// Adds a new attribute. If an attribute with the same local name and namespace
    /// URI is already present on the element, its prefix is changed to be the prefix
    /// part of the qualifiedName, and its value is changed to be the value parameter.
    /// ```
    ///
    /// # Errors
    /// Same as [`DocumentRef::create_attribute_ns`](super::document::DocumentRef::create_attribute_ns).
    pub fn set_attribute_ns(
        &mut self,
        namespace_uri: Option<&str>,
        qualified_name: &str,
        value: impl Into<String>,
    ) -> Result<(), DOMException> {
        check_qualified_name(namespace_uri, qualified_name)?;
        let namespace_uri = namespace_uri.filter(|uri| !uri.is_empty());
        let (prefix, local_name) = split_prefix_local(qualified_name);
        let local_name = local_name.unwrap_or(qualified_name);

        if let Some(mut attr) = self.get_attribute_node_ns(namespace_uri, local_name) {
            attr.as_node_ref().set_prefix_unchecked(prefix.map(Rc::from));
            attr.set_value(value);
            return Ok(());
        }
        let document = self.0.document_node();
        let attr = AttrRef::create(
            document.as_ref(),
            qualified_name.into(),
            namespace_uri.map(Rc::from),
            value,
        );
        self.attribute_map().push_unchecked(attr.into());
        Ok(())
    }

    /// Implementation of [`removeAttributeNS`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-ElRemAtNS) method.
    pub fn remove_attribute_ns(&mut self, namespace_uri: Option<&str>, local_name: &str) {
        if let Some(attr) = self
            .attribute_map()
            .remove_named_item_ns(namespace_uri, local_name)
        {
            self.forget_id(&attr);
        }
    }

    /// Implementation of [`getAttributeNodeNS`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-ElGetAtNodeNS) method.
    pub fn get_attribute_node_ns(
        &self,
        namespace_uri: Option<&str>,
        local_name: &str,
    ) -> Option<AttrRef> {
        self.attribute_map()
            .get_named_item_ns(namespace_uri, local_name)
            .and_then(|attr| attr.as_attribute())
    }

    /// Implementation of [`hasAttribute`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-ElHasAttr) method.
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute_map().get_named_item(name).is_some()
    }

    /// Implementation of [`hasAttributeNS`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-ElHasAttrNS) method.
    pub fn has_attribute_ns(&self, namespace_uri: Option<&str>, local_name: &str) -> bool {
        self.attribute_map()
            .get_named_item_ns(namespace_uri, local_name)
            .is_some()
    }

    /// Implementation of [`getElementsByTagName`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1938918D) method.
    ///
    /// Return the descendant elements named `name` in preorder.
    /// `"*"` matches all elements.
    pub fn get_elements_by_tag_name(&self, name: &str) -> Vec<ElementRef> {
        elements_by_tag_name(&self.0, name)
    }

    /// Implementation of [`getElementsByTagNameNS`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-A6C90942) method.
    ///
    /// `"*"` matches all namespaces or all local names.
    pub fn get_elements_by_tag_name_ns(
        &self,
        namespace_uri: Option<&str>,
        local_name: &str,
    ) -> Vec<ElementRef> {
        elements_by_tag_name_ns(&self.0, namespace_uri, local_name)
    }

    /// Implementation of [`setIdAttribute`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-ElSetIdAttr) method.
    ///
    /// # Errors
    /// - `NotFoundErr`: this element has no attribute named `name`.
    pub fn set_id_attribute(&mut self, name: &str, is_id: bool) -> Result<(), DOMException> {
        let attr = self
            .get_attribute_node(name)
            .ok_or(DOMException::NotFoundErr)?;
        self.apply_id(attr, is_id);
        Ok(())
    }

    /// Implementation of [`setIdAttributeNS`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-ElSetIdAttrNS) method.
    pub fn set_id_attribute_ns(
        &mut self,
        namespace_uri: Option<&str>,
        local_name: &str,
        is_id: bool,
    ) -> Result<(), DOMException> {
        let attr = self
            .get_attribute_node_ns(namespace_uri, local_name)
            .ok_or(DOMException::NotFoundErr)?;
        self.apply_id(attr, is_id);
        Ok(())
    }

    /// Implementation of [`setIdAttributeNode`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-ElSetIdAttrNode) method.
    ///
    /// # Errors
    /// - `NotFoundErr`: `id_attr` is not an attribute of this element.
    pub fn set_id_attribute_node(&mut self, id_attr: AttrRef, is_id: bool) -> Result<(), DOMException> {
        if id_attr
            .owner_element()
            .is_none_or(|elem| !elem.is_same_node(self))
        {
            return Err(DOMException::NotFoundErr);
        }
        self.apply_id(id_attr, is_id);
        Ok(())
    }

    fn apply_id(&self, mut attr: AttrRef, is_id: bool) {
        attr.set_is_id(is_id);
        let Some(mut document) = self.owner_document() else {
            return;
        };
        if is_id {
            document.index_id(&attr.value(), self);
        } else {
            document.unindex_id(&attr.value(), self);
        }
    }

    /// Drop the id index entry held by `attr`, which has just left this element.
    fn forget_id(&self, attr: &NodeRef) {
        let Some(attr) = attr.as_attribute().filter(|attr| attr.is_id()) else {
            return;
        };
        if let Some(mut document) = self.owner_document() {
            document.unindex_id(&attr.value(), self);
        }
    }

    /// The namespace bindings recorded on this element by the last namespace
    /// normalization that visited it.
    pub fn namespace_bindings(&self) -> BindingScope {
        match &self.0.record().data {
            NodeData::Element(data) => data.bindings.clone(),
            _ => BindingScope::new(),
        }
    }

    pub(super) fn with_bindings_mut<R>(&self, f: impl FnOnce(&mut BindingScope) -> R) -> R {
        match &mut self.0.record_mut().data {
            NodeData::Element(data) => f(&mut data.bindings),
            _ => unreachable!("ElementRef always wraps an Element node"),
        }
    }

    /// The nearest ancestor that is an Element.
    fn parent_element(&self) -> Option<ElementRef> {
        self.0.ancestor_element().and_then(|elem| elem.as_element())
    }

    /// The `xmlns` or `xmlns:prefix` attribute declaring `prefix` on this element.
    fn declaration(&self, prefix: Option<&str>) -> Option<AttrRef> {
        match prefix {
            Some(prefix) => self.get_attribute_node(&format!("xmlns:{prefix}")),
            None => self.get_attribute_node("xmlns"),
        }
    }

    /// [lookupNamespaceURI](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/namespaces-algorithms.html#lookupNamespaceURIAlgo)
    /// for an Element.
    pub(super) fn namespace_uri_in_scope(&self, prefix: Option<&str>) -> Option<Rc<str>> {
        if let Some(namespace_uri) = self.namespace_uri() {
            if self.prefix().as_deref() == prefix {
                return Some(namespace_uri);
            }
        }
        if let Some(attr) = self.declaration(prefix) {
            let value = attr.value();
            return (!value.is_empty()).then(|| value.into());
        }
        self.parent_element()?.namespace_uri_in_scope(prefix)
    }

    /// [isDefaultNamespace](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/namespaces-algorithms.html#isDefaultNamespaceAlgo)
    /// for an Element.
    pub(super) fn is_default_namespace_in_scope(&self, namespace_uri: Option<&str>) -> bool {
        if self.prefix().is_none() && self.namespace_uri().is_some() {
            return self.namespace_uri().as_deref() == namespace_uri;
        }
        if let Some(attr) = self.declaration(None) {
            let value = attr.value();
            return Some(value.as_str()).filter(|v| !v.is_empty()) == namespace_uri;
        }
        match self.parent_element() {
            Some(elem) => elem.is_default_namespace_in_scope(namespace_uri),
            // no default namespace is in scope
            None => namespace_uri.is_none(),
        }
    }

    /// Implementation of [`lookupNamespacePrefix`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/namespaces-algorithms.html#lookupNamespacePrefixAlgo)
    ///
    /// A prefix is returned only if it is still bound to `namespace_uri` as seen
    /// from `original`.
    pub(crate) fn lookup_namespace_prefix(
        &self,
        namespace_uri: &str,
        original: &ElementRef,
    ) -> Option<Rc<str>> {
        let resolves = |prefix: &str| {
            original.namespace_uri_in_scope(Some(prefix)).as_deref() == Some(namespace_uri)
        };

        if let Some(prefix) = self.prefix() {
            if self.namespace_uri().as_deref() == Some(namespace_uri) && resolves(&prefix) {
                return Some(prefix);
            }
        }

        for attr in self.attribute_map().items() {
            if attr.prefix().as_deref() != Some("xmlns")
                || attr.node_value().as_deref() != Some(namespace_uri)
            {
                continue;
            }
            if let Some(local_name) = attr.local_name() {
                if resolves(&local_name) {
                    return Some(local_name);
                }
            }
        }

        self.parent_element()?
            .lookup_namespace_prefix(namespace_uri, original)
    }
}

fn matches_tag_name(elem: &ElementRef, name: &str) -> bool {
    name == "*" || elem.node_name().as_ref() == name
}

fn matches_tag_name_ns(elem: &ElementRef, namespace_uri: Option<&str>, local_name: &str) -> bool {
    let namespace_uri = namespace_uri.filter(|uri| !uri.is_empty());
    (namespace_uri == Some("*") || elem.namespace_uri().as_deref() == namespace_uri)
        && (local_name == "*"
            || elem
                .local_name()
                .unwrap_or_else(|| elem.node_name())
                .as_ref()
                == local_name)
}

/// Collect the descendant elements of `root` accepted by `filter`, in preorder.
fn descendant_elements(
    root: &NodeRef,
    mut filter: impl FnMut(&ElementRef) -> bool,
) -> Vec<ElementRef> {
    let mut found = vec![];
    let mut current = root.following_in(root);
    while let Some(node) = current {
        if let Some(elem) = node.as_element().filter(|elem| filter(elem)) {
            found.push(elem);
        }
        current = node.following_in(root);
    }
    found
}

/// `getElementsByTagName` with the matching rule of [`ElementRef::get_elements_by_tag_name`].
pub(super) fn elements_by_tag_name(root: &NodeRef, name: &str) -> Vec<ElementRef> {
    descendant_elements(root, |elem| matches_tag_name(elem, name))
}

/// `getElementsByTagNameNS` with the matching rule of [`ElementRef::get_elements_by_tag_name_ns`].
pub(super) fn elements_by_tag_name_ns(
    root: &NodeRef,
    namespace_uri: Option<&str>,
    local_name: &str,
) -> Vec<ElementRef> {
    descendant_elements(root, |elem| {
        matches_tag_name_ns(elem, namespace_uri, local_name)
    })
}

impl NodeRef {
    /// `true` if this node is `ancestor` or one of its descendants.
    pub(super) fn is_inclusive_descendant_of(&self, ancestor: &NodeRef) -> bool {
        let mut current = Some(self.clone());
        while let Some(node) = current {
            if node.is_same_node(ancestor) {
                return true;
            }
            current = node.parent_node();
        }
        false
    }
}
