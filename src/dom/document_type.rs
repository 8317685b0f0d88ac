use std::rc::Rc;

use super::{
    NodeType,
    named_node_map::NamedNodeMap,
    node::{Node, NodeData, NodeRef, impl_node_handle},
};

/// Payload of a DocumentType node.
pub(crate) struct DocumentTypeData {
    /// Implementation of `publicId` attribute.
    public_id: Option<Rc<str>>,
    /// Implementation of `systemId` attribute.
    system_id: Option<Rc<str>>,
    /// Implementation of `internalSubset` attribute.
    internal_subset: Option<Rc<str>>,
    /// Implementation of `entities` attribute.
    entities: NamedNodeMap,
    /// Implementation of `notations` attribute.
    notations: NamedNodeMap,
}

impl DocumentTypeData {
    fn new(public_id: Option<Rc<str>>, system_id: Option<Rc<str>>) -> Self {
        Self {
            public_id,
            system_id,
            internal_subset: None,
            entities: NamedNodeMap::of_kind(&[NodeType::Entity]),
            notations: NamedNodeMap::of_kind(&[NodeType::Notation]),
        }
    }

    /// A copy with the same identifiers and empty maps.
    pub(super) fn duplicate_identifiers(&self) -> Self {
        Self {
            internal_subset: self.internal_subset.clone(),
            ..Self::new(self.public_id.clone(), self.system_id.clone())
        }
    }
}

impl_node_handle!(
    /// Implementation of [DocumentType](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-412266927)
    /// interface on [1.5 Extended Interfaces: XML Module](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-E067D597)
    ///
    /// # Specification
    /// ```text
    /// Each Document has a doctype attribute whose value is either null or a
    /// DocumentType object. The DocumentType interface in the DOM Core provides an
    /// interface to the list of entities that are defined for the document, and
    /// little else because the effect of namespaces and the various XML schema
    /// efforts on DTD representation are not clearly understood as of this writing.
    /// ```
    DocumentTypeRef,
    DocumentType,
    as_document_type
);

impl DocumentTypeRef {
    /// Create a DocumentType that is not used with any document yet.
    ///
    /// This method does not validate `qualified_name`.
    pub(super) fn create(
        owner_document: Option<&NodeRef>,
        qualified_name: Rc<str>,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Self {
        let data = DocumentTypeData::new(public_id.map(Rc::from), system_id.map(Rc::from));
        DocumentTypeRef(NodeRef::create(owner_document, qualified_name, None, |_| {
            NodeData::DocumentType(data)
        }))
    }

    fn with_data<R>(&self, f: impl FnOnce(&DocumentTypeData) -> R) -> R {
        match &self.0.record().data {
            NodeData::DocumentType(doctype) => f(doctype),
            _ => unreachable!("DocumentTypeRef always wraps a DocumentType node"),
        }
    }

    /// Implementation of [`name`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1844763134) attribute.
    pub fn name(&self) -> Rc<str> {
        self.node_name()
    }

    pub fn public_id(&self) -> Option<Rc<str>> {
        self.with_data(|doctype| doctype.public_id.clone())
    }

    pub fn system_id(&self) -> Option<Rc<str>> {
        self.with_data(|doctype| doctype.system_id.clone())
    }

    /// Implementation of [`internalSubset`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-Core-DocType-internalSubset) attribute.
    pub fn internal_subset(&self) -> Option<Rc<str>> {
        self.with_data(|doctype| doctype.internal_subset.clone())
    }

    /// Record the internal subset as text, for parsers that build this node.
    pub fn set_internal_subset(&mut self, internal_subset: Option<&str>) {
        let internal_subset = internal_subset.map(Rc::from);
        if let NodeData::DocumentType(doctype) = &mut self.0.record_mut().data {
            doctype.internal_subset = internal_subset;
        }
    }

    /// Implementation of [`entities`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1788794630) attribute.
    ///
    /// Parameter entities are not contained.
    pub fn entities(&self) -> NamedNodeMap {
        self.with_data(|doctype| doctype.entities.clone())
    }

    /// Implementation of [`notations`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-D46829EF) attribute.
    pub fn notations(&self) -> NamedNodeMap {
        self.with_data(|doctype| doctype.notations.clone())
    }

    /// Compare the identifiers as `isEqualNode` requires.
    pub(super) fn has_same_identifiers(&self, other: &DocumentTypeRef) -> bool {
        self.public_id() == other.public_id()
            && self.system_id() == other.system_id()
            && self.internal_subset() == other.internal_subset()
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::{DOMException, dom_implementation::DOMImplementation};

    use super::*;

    #[test]
    fn document_type_test() {
        let mut doctype = DOMImplementation
            .create_document_type("html", Some("-//W3C//DTD XHTML 1.0 Strict//EN"), None)
            .unwrap();
        assert_eq!(doctype.name().as_ref(), "html");
        assert!(doctype.owner_document().is_none());
        assert!(doctype.system_id().is_none());
        doctype.set_internal_subset(Some("<!ENTITY e 'x'>"));

        let doc = DOMImplementation
            .create_document(None, Some("html"), Some(doctype.clone()))
            .unwrap();
        assert_eq!(doc.doctype(), Some(doctype.clone()));
        assert_eq!(doctype.owner_document(), Some(doc.clone()));

        let mut entities = doctype.entities();
        entities
            .set_named_item(doc.create_entity("e", None, None, None).unwrap().into())
            .unwrap();
        assert_eq!(
            entities.set_named_item(doc.create_comment("c").into()),
            Err(DOMException::HierarchyRequestErr)
        );
        doctype
            .notations()
            .set_named_item(doc.create_notation("n", None, Some("n.bin")).unwrap().into())
            .unwrap();

        let copy = doctype.clone_node(true);
        assert!(copy.is_equal_node(&doctype));
        let copy = copy.as_document_type().unwrap();
        assert_eq!(copy.entities().len(), 1);
        assert_eq!(
            copy.notations()
                .get_named_item("n")
                .and_then(|n| n.as_notation())
                .and_then(|n| n.system_id())
                .as_deref(),
            Some("n.bin")
        );
    }
}
