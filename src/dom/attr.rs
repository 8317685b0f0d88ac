use std::{mem::replace, rc::Rc};

use super::{
    element::ElementRef,
    node::{NodeData, NodeRef, NodeWeakRef, impl_node_handle},
};

/// Payload of an Attribute node.
pub(crate) struct AttrData {
    pub(super) value: String,
    // [Interface Attr](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-637646024)
    // ```
    // Attr objects inherit the Node interface,
    // but since they are not actually child nodes of the element they describe,
    // the DOM does not consider them part of the document tree.
    // ```
    pub(super) owner_element: Option<NodeWeakRef>,
    specified: bool,
    is_id: bool,
}

impl AttrData {
    pub(super) fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            owner_element: None,
            specified: true,
            is_id: false,
        }
    }

    /// A copy for `cloneNode`.\
    /// The copy is not owned by any element and is always specified.
    pub(super) fn duplicate(&self) -> Self {
        Self::new(self.value.clone())
    }
}

impl_node_handle!(
    /// Implementation of [Interface Attr](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-637646024).
    AttrRef,
    Attribute,
    as_attribute
);

impl AttrRef {
    pub(super) fn create(
        owner_document: Option<&NodeRef>,
        qualified_name: Rc<str>,
        namespace_uri: Option<Rc<str>>,
        value: impl Into<String>,
    ) -> Self {
        let value = value.into();
        AttrRef(NodeRef::create(
            owner_document,
            qualified_name,
            namespace_uri,
            |_| NodeData::Attribute(AttrData::new(value)),
        ))
    }

    fn with_data<R>(&self, f: impl FnOnce(&AttrData) -> R) -> R {
        match &self.0.record().data {
            NodeData::Attribute(attr) => f(attr),
            _ => unreachable!("AttrRef always wraps an Attribute node"),
        }
    }

    fn with_data_mut<R>(&self, f: impl FnOnce(&mut AttrData) -> R) -> R {
        match &mut self.0.record_mut().data {
            NodeData::Attribute(attr) => f(attr),
            _ => unreachable!("AttrRef always wraps an Attribute node"),
        }
    }

    /// Implementation of [`name`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1112119403) attribute.
    pub fn name(&self) -> Rc<str> {
        self.0.record().node_name.clone()
    }

    /// Implementation of [`value`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-221662474) attribute.
    pub fn value(&self) -> String {
        self.with_data(|attr| attr.value.clone())
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        let value = value.into();
        self.with_data_mut(|attr| {
            attr.value = value;
            attr.specified = true;
        });
    }

    /// Implementation of [`specified`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-862529273) attribute.
    pub fn specified(&self) -> bool {
        self.with_data(|attr| attr.specified)
    }

    /// Implementation of [`ownerElement`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-Attr-ownerElement) attribute.
    pub fn owner_element(&self) -> Option<ElementRef> {
        self.with_data(|attr| attr.owner_element.as_ref().and_then(NodeWeakRef::upgrade))
            .and_then(|elem| elem.as_element())
    }

    /// Implementation of [`isId`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Attr-isId) attribute.
    pub fn is_id(&self) -> bool {
        self.with_data(|attr| attr.is_id)
    }

    pub(super) fn set_is_id(&mut self, is_id: bool) -> bool {
        self.with_data_mut(|attr| replace(&mut attr.is_id, is_id))
    }
}

impl NodeRef {
    /// Set the owner element if this is an Attribute. No effect on other kinds.
    pub(super) fn set_owner_element(&self, owner_element: Option<NodeWeakRef>) {
        if let NodeData::Attribute(attr) = &mut self.record_mut().data {
            attr.owner_element = owner_element;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::{document::DocumentRef, node::Node};

    #[test]
    fn attribute_accessors_test() {
        let doc = DocumentRef::new(None, Some("root"), None).unwrap();
        let mut attr = doc.create_attribute_ns(Some("urn:a"), "a:b").unwrap();
        assert_eq!(attr.name().as_ref(), "a:b");
        assert_eq!(attr.prefix().as_deref(), Some("a"));
        assert_eq!(attr.local_name().as_deref(), Some("b"));
        assert_eq!(attr.value(), "");
        assert!(attr.specified());
        assert!(!attr.is_id());
        assert!(attr.owner_element().is_none());
        assert!(attr.parent_node().is_none());

        attr.set_value("v");
        assert_eq!(attr.node_value().as_deref(), Some("v"));
        assert_eq!(attr.text_content().as_deref(), Some("v"));
    }

    #[test]
    fn attribute_lookup_delegates_to_owner_test() {
        let doc = DocumentRef::new(Some("urn:root"), Some("r:root"), None).unwrap();
        let mut root = doc.document_element().unwrap();
        root.set_attribute_ns(Some("urn:other"), "o:attr", "1").unwrap();
        let attr = root.get_attribute_node_ns(Some("urn:other"), "attr").unwrap();
        assert_eq!(
            attr.lookup_namespace_uri(Some("r")),
            root.lookup_namespace_uri(Some("r"))
        );
        assert_eq!(attr.lookup_prefix("urn:root").as_deref(), Some("r"));
    }
}
