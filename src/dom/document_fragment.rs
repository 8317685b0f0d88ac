use super::node::{NodeData, NodeRef, impl_node_handle};

impl_node_handle!(
    /// Implementation of [DocumentFragment](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-B63ED1A3)
    /// interface on [1.4 Fundamental Interfaces: Core Module](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-BBACDC08)
    ///
    /// # Specification
    /// ```text
    /// DocumentFragment is a "lightweight" or "minimal" Document object. It is very
    /// common to want to be able to extract a portion of a document's tree or to
    /// create a new fragment of a document.
    ///
    /// Furthermore, various operations -- such as inserting nodes as children of
    /// another Node -- may take DocumentFragment objects as arguments; this results
    /// in all the child nodes of the DocumentFragment being moved to the child list
    /// of this node.
    /// ```
    DocumentFragmentRef,
    DocumentFragment,
    as_document_fragment
);

impl DocumentFragmentRef {
    pub(super) fn create(owner_document: Option<&NodeRef>) -> Self {
        DocumentFragmentRef(NodeRef::create(
            owner_document,
            "#document-fragment".into(),
            None,
            |_| NodeData::DocumentFragment,
        ))
    }
}
