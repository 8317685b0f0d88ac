use std::{collections::HashMap, rc::Rc};

use crate::qname::{split_prefix_local, validate_name};

use super::{
    DOMException, NodeType, XML_NS_NAMESPACE, check_owner_document_sameness,
    check_qualified_name,
    attr::AttrRef,
    character_data::{CDATASectionRef, CommentRef, TextRef},
    configuration::DOMConfiguration,
    document_fragment::DocumentFragmentRef,
    document_type::DocumentTypeRef,
    dom_error::DOMError,
    dom_implementation::DOMImplementation,
    element::{ElementRef, elements_by_tag_name, elements_by_tag_name_ns},
    entity::EntityRef,
    entity_reference::EntityReferenceRef,
    node::{Node, NodeData, NodeRef, NodeWeakRef, impl_node_handle},
    notation::NotationRef,
    pi::ProcessingInstructionRef,
    user_data::{OperationType, notify_user_data_handlers},
};

/// Document-wide state held by the Document node.
pub(crate) struct DocumentContext {
    /// Elements registered by value of their ID attributes.
    id_index: HashMap<Rc<str>, NodeWeakRef>,
    /// The next number used for a synthetic `NS<k>` prefix.
    namespace_index: usize,
    config: DOMConfiguration,
    document_uri: Option<Rc<str>>,
    xml_version: Rc<str>,
}

impl DocumentContext {
    fn new() -> Self {
        Self {
            id_index: HashMap::new(),
            namespace_index: 1,
            config: DOMConfiguration::new(),
            document_uri: None,
            xml_version: "1.0".into(),
        }
    }

    /// The context of a cloned Document.\
    /// The id index and the prefix counter are not carried over.
    pub(super) fn duplicate(&self) -> Self {
        Self {
            config: self.config.deep_copy(),
            document_uri: self.document_uri.clone(),
            xml_version: self.xml_version.clone(),
            ..Self::new()
        }
    }
}

impl_node_handle!(
    /// Implementation of [Document](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#i-Document)
    /// interface on [1.4 Fundamental Interfaces: Core Module](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-BBACDC08)
    ///
    /// # Specification
    /// ```text
    /// The Document interface represents the entire HTML or XML document. Conceptually,
    /// it is the root of the document tree, and provides the primary access to the
    /// document's data.
    ///
    /// Since elements, text nodes, comments, processing instructions, etc. cannot exist
    /// outside the context of a Document, the Document interface also contains the
    /// factory methods needed to create these objects. The Node objects created have a
    /// ownerDocument attribute which associates them with the Document within whose
    /// context they were created.
    /// ```
    DocumentRef,
    Document,
    as_document
);

impl DocumentRef {
    /// Implementation of [`createDocument`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Level-2-Core-DOM-createDocument) method.
    ///
    /// In the specification, this is implemented in [`DOMImplementation`].
    ///
    /// # Specification
    /// ```text
    /// Creates a DOM Document object of the specified type with its document element.
    ///
    /// Return Value
    ///     Document A new Document object with its document element. If the NamespaceURI,
    ///              qualifiedName, and doctype are null, the returned Document is empty with
    ///              no document element.
    ///
    /// Exceptions
    ///     DOMException
    ///     INVALID_CHARACTER_ERR: Raised if the specified qualified name is not an XML name
    ///                            according to [XML 1.0].
    ///     NAMESPACE_ERR:         Raised if the qualifiedName is malformed, if the
    ///                            qualifiedName has a prefix and the namespaceURI is null,
    ///                            or if the qualifiedName is null and the namespaceURI is
    ///                            different from null, or if the qualifiedName has a prefix
    ///                            that is "xml" and the namespaceURI is different from
    ///                            "http://www.w3.org/XML/1998/namespace" [XML Namespaces].
    ///     WRONG_DOCUMENT_ERR:    Raised if doctype has already been used with a different
    ///                            document or was created from a different implementation.
    /// ```
    pub fn new(
        namespace_uri: Option<&str>,
        qualified_name: Option<&str>,
        doctype: Option<DocumentTypeRef>,
    ) -> Result<Self, DOMException> {
        if doctype
            .as_ref()
            .is_some_and(|doctype| doctype.owner_document().is_some())
        {
            return Err(DOMException::WrongDocumentErr);
        }
        let namespace_uri = namespace_uri.filter(|uri| !uri.is_empty());
        let qualified_name = qualified_name.filter(|name| !name.is_empty());
        if qualified_name.is_none() && namespace_uri.is_some() {
            return Err(DOMException::NamespaceErr);
        }

        let mut new = DocumentRef(NodeRef::create(None, "#document".into(), None, |_| {
            NodeData::Document(DocumentContext::new())
        }));
        let element = qualified_name
            .map(|name| new.create_element_ns(namespace_uri, name))
            .transpose()?;
        if let Some(doctype) = doctype {
            new.append_child(doctype.into())?;
        }
        if let Some(element) = element {
            new.append_child(element.into())?;
        }
        Ok(new)
    }

    fn with_context<R>(&self, f: impl FnOnce(&DocumentContext) -> R) -> R {
        match &self.0.record().data {
            NodeData::Document(context) => f(context),
            _ => unreachable!("DocumentRef always wraps a Document node"),
        }
    }

    fn with_context_mut<R>(&self, f: impl FnOnce(&mut DocumentContext) -> R) -> R {
        match &mut self.0.record_mut().data {
            NodeData::Document(context) => f(context),
            _ => unreachable!("DocumentRef always wraps a Document node"),
        }
    }

    /// Implementation of [`doctype`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-B63ED1A31) attribute.
    pub fn doctype(&self) -> Option<DocumentTypeRef> {
        self.child_nodes()
            .into_iter()
            .find_map(|child| child.as_document_type())
    }

    /// Implementation of [`implementation`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1B793EBA) attribute.
    pub fn implementation(&self) -> DOMImplementation {
        DOMImplementation
    }

    /// Implementation of [`documentElement`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-87CD092) attribute.
    pub fn document_element(&self) -> Option<ElementRef> {
        self.child_nodes()
            .into_iter()
            .find_map(|child| child.as_element())
    }

    /// Implementation of [`documentURI`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Document3-documentURI) attribute.
    pub fn document_uri(&self) -> Option<Rc<str>> {
        self.with_context(|context| context.document_uri.clone())
    }

    pub fn set_document_uri(&mut self, document_uri: Option<&str>) {
        let document_uri = document_uri.map(Rc::from);
        self.with_context_mut(|context| context.document_uri = document_uri);
    }

    /// Implementation of [`xmlVersion`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Document3-version) attribute.
    pub fn xml_version(&self) -> Rc<str> {
        self.with_context(|context| context.xml_version.clone())
    }

    /// # Errors
    /// - `NotSupportedErr`: `version` is neither `1.0` nor `1.1`.
    pub fn set_xml_version(&mut self, version: &str) -> Result<(), DOMException> {
        if !matches!(version, "1.0" | "1.1") {
            return Err(DOMException::NotSupportedErr);
        }
        self.with_context_mut(|context| context.xml_version = version.into());
        Ok(())
    }

    /// Implementation of [`domConfig`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Document3-domConfig) attribute.
    ///
    /// The returned handle shares its parameters with this document.
    pub fn dom_config(&self) -> DOMConfiguration {
        self.with_context(|context| context.config.clone())
    }

    /// Implementation of [`createElement`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-2141741547) method.
    ///
    /// The name is split on the first `:`, but the element has no namespace URI.
    ///
    /// # Errors
    /// - `InvalidCharacterErr`: `tag_name` is not an XML name.
    pub fn create_element(&self, tag_name: &str) -> Result<ElementRef, DOMException> {
        validate_name(tag_name).map_err(|_| DOMException::InvalidCharacterErr)?;
        Ok(ElementRef::create(Some(&self.0), tag_name.into(), None))
    }

    /// Implementation of [`createElementNS`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-DocCrElNS) method.
    ///
    /// # Errors
    /// - `InvalidCharacterErr`: `qualified_name` is not a QName.
    /// - `NamespaceErr`: `qualified_name` has a prefix and `namespace_uri` is `None`,
    ///   the prefix is `xml` with another namespace than the XML namespace, or
    ///   `xmlns` and the xmlns namespace are not used together.
    pub fn create_element_ns(
        &self,
        namespace_uri: Option<&str>,
        qualified_name: &str,
    ) -> Result<ElementRef, DOMException> {
        check_qualified_name(namespace_uri, qualified_name)?;
        let namespace_uri = namespace_uri.filter(|uri| !uri.is_empty());
        Ok(ElementRef::create(
            Some(&self.0),
            qualified_name.into(),
            namespace_uri.map(Rc::from),
        ))
    }

    /// Implementation of [`createAttribute`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1084891198) method.
    ///
    /// # Errors
    /// - `InvalidCharacterErr`: `name` is not an XML name.
    pub fn create_attribute(&self, name: &str) -> Result<AttrRef, DOMException> {
        validate_name(name).map_err(|_| DOMException::InvalidCharacterErr)?;
        Ok(AttrRef::create(Some(&self.0), name.into(), None, ""))
    }

    /// Implementation of [`createAttributeNS`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-DocCrAttrNS) method.
    ///
    /// # Errors
    /// Same as [`DocumentRef::create_element_ns`].
    pub fn create_attribute_ns(
        &self,
        namespace_uri: Option<&str>,
        qualified_name: &str,
    ) -> Result<AttrRef, DOMException> {
        check_qualified_name(namespace_uri, qualified_name)?;
        let namespace_uri = namespace_uri.filter(|uri| !uri.is_empty());
        Ok(AttrRef::create(
            Some(&self.0),
            qualified_name.into(),
            namespace_uri.map(Rc::from),
            "",
        ))
    }

    /// Implementation of [`createTextNode`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1975348127) method.
    pub fn create_text_node(&self, data: &str) -> TextRef {
        TextRef::create(Some(&self.0), data)
    }

    /// Implementation of [`createComment`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1334481328) method.
    pub fn create_comment(&self, data: &str) -> CommentRef {
        CommentRef::create(Some(&self.0), data)
    }

    /// Implementation of [`createCDATASection`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-D26C0AF8) method.
    pub fn create_cdata_section(&self, data: &str) -> CDATASectionRef {
        CDATASectionRef::create(Some(&self.0), data)
    }

    /// Implementation of [`createProcessingInstruction`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-135944439) method.
    ///
    /// # Errors
    /// - `InvalidCharacterErr`: `target` is not an XML name.
    pub fn create_processing_instruction(
        &self,
        target: &str,
        data: Option<&str>,
    ) -> Result<ProcessingInstructionRef, DOMException> {
        validate_name(target).map_err(|_| DOMException::InvalidCharacterErr)?;
        Ok(ProcessingInstructionRef::create(
            Some(&self.0),
            target.into(),
            data.unwrap_or_default(),
        ))
    }

    /// Implementation of [`createDocumentFragment`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-35CB04B5) method.
    pub fn create_document_fragment(&self) -> DocumentFragmentRef {
        DocumentFragmentRef::create(Some(&self.0))
    }

    /// Implementation of [`createEntityReference`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-392B75AE) method.
    ///
    /// # Errors
    /// - `InvalidCharacterErr`: `name` is not an XML name.
    pub fn create_entity_reference(&self, name: &str) -> Result<EntityReferenceRef, DOMException> {
        validate_name(name).map_err(|_| DOMException::InvalidCharacterErr)?;
        Ok(EntityReferenceRef::create(Some(&self.0), name.into()))
    }

    /// Create an Entity owned by this document, to be stored in
    /// [`DocumentTypeRef::entities`].
    ///
    /// # Errors
    /// - `InvalidCharacterErr`: `name` is not an XML name.
    pub fn create_entity(
        &self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
        notation_name: Option<&str>,
    ) -> Result<EntityRef, DOMException> {
        validate_name(name).map_err(|_| DOMException::InvalidCharacterErr)?;
        Ok(EntityRef::create(
            Some(&self.0),
            name.into(),
            public_id,
            system_id,
            notation_name,
        ))
    }

    /// Create a Notation owned by this document, to be stored in
    /// [`DocumentTypeRef::notations`].
    ///
    /// # Errors
    /// - `InvalidCharacterErr`: `name` is not an XML name.
    pub fn create_notation(
        &self,
        name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Result<NotationRef, DOMException> {
        validate_name(name).map_err(|_| DOMException::InvalidCharacterErr)?;
        Ok(NotationRef::create(
            Some(&self.0),
            name.into(),
            public_id,
            system_id,
        ))
    }

    /// Implementation of [`getElementsByTagName`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-A6C9094) method.
    pub fn get_elements_by_tag_name(&self, tag_name: &str) -> Vec<ElementRef> {
        elements_by_tag_name(&self.0, tag_name)
    }

    /// Implementation of [`getElementsByTagNameNS`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-getElBTNNS) method.
    pub fn get_elements_by_tag_name_ns(
        &self,
        namespace_uri: Option<&str>,
        local_name: &str,
    ) -> Vec<ElementRef> {
        elements_by_tag_name_ns(&self.0, namespace_uri, local_name)
    }

    /// Implementation of [`getElementById`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-getElBId) method.
    ///
    /// # Specification
    /// ```text
    /// Returns the Element that has an ID attribute with the given value.
    /// If no such element exists, this returns null. If more than one element has
    /// an ID attribute with that value, what is returned is undefined.
    /// The DOM implementation is expected to use the attribute Attr.isId to determine
    /// if an attribute is of type ID.
    /// ```
    ///
    /// Elements that are not in the tree of this document are never returned.
    pub fn get_element_by_id(&self, element_id: &str) -> Option<ElementRef> {
        let elem = self
            .with_context(|context| context.id_index.get(element_id).cloned())?
            .upgrade()?;
        if !elem.is_inclusive_descendant_of(&self.0) {
            return None;
        }
        let has_id = elem.attributes()?.items().into_iter().any(|attr| {
            attr.as_attribute()
                .is_some_and(|attr| attr.is_id() && attr.value() == element_id)
        });
        has_id.then(|| elem.as_element()).flatten()
    }

    /// Register `element` under `element_id`, as parsers do for attributes declared
    /// with the ID type.
    ///
    /// # Errors
    /// - `WrongDocumentErr`: `element` belongs to another document.
    pub fn register_id(
        &mut self,
        element_id: &str,
        element: &ElementRef,
    ) -> Result<(), DOMException> {
        if !check_owner_document_sameness(&*self, element) {
            return Err(DOMException::WrongDocumentErr);
        }
        self.index_id(element_id, element);
        Ok(())
    }

    pub(super) fn index_id(&mut self, element_id: &str, element: &ElementRef) {
        let weak = element.as_node_ref().downgrade();
        self.with_context_mut(|context| context.id_index.insert(element_id.into(), weak));
    }

    /// Remove the entry of `element_id` only if it refers to `element`.
    pub(super) fn unindex_id(&mut self, element_id: &str, element: &ElementRef) {
        self.with_context_mut(|context| {
            let registered = context
                .id_index
                .get(element_id)
                .and_then(NodeWeakRef::upgrade)
                .is_some_and(|registered| registered.is_same_node(element));
            if registered {
                context.id_index.remove(element_id);
            }
        });
    }

    /// Implementation of [`importNode`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Core-Document-importNode) method.
    ///
    /// # Specification
    /// ```text
    /// Imports a node from another document to this document, without altering or
    /// removing the source node from the original document; this method creates a new
    /// copy of the source node. The returned node has no parent; (parentNode is null).
    /// ```
    ///
    /// Handlers of the source node are called with [`OperationType::NodeImported`].
    ///
    /// # Errors
    /// - `NotSupportedErr`: `imported` is a Document or a DocumentType.
    pub fn import_node(&mut self, imported: NodeRef, deep: bool) -> Result<NodeRef, DOMException> {
        if matches!(
            imported.node_type(),
            NodeType::Document | NodeType::DocumentType
        ) {
            return Err(DOMException::NotSupportedErr);
        }
        let copy = imported.duplicate(deep, Some(&self.0));
        notify_user_data_handlers(&imported, OperationType::NodeImported, Some(&copy));
        Ok(copy)
    }

    /// Implementation of [`adoptNode`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Document3-adoptNode) method.
    ///
    /// # Specification
    /// ```text
    /// Attempts to adopt a node from another document to this document. If supported,
    /// it changes the ownerDocument of the source node, its children, as well as the
    /// attached attribute nodes if there are any. If the source node has a parent it
    /// is first removed from the child list of its parent.
    /// ```
    ///
    /// An Attribute is first removed from its owner element.
    ///
    /// # Errors
    /// - `NotSupportedErr`: `source` is a Document or a DocumentType.
    pub fn adopt_node(&mut self, source: NodeRef) -> Result<NodeRef, DOMException> {
        if matches!(
            source.node_type(),
            NodeType::Document | NodeType::DocumentType
        ) {
            return Err(DOMException::NotSupportedErr);
        }

        if let Some(attr) = source.as_attribute() {
            if let Some(mut elem) = attr.owner_element() {
                elem.remove_attribute_node(attr)?;
            }
        }
        if let Some(mut parent) = source.parent_node() {
            parent.remove_child(source.clone())?;
        }
        source.adopt_subtree(&self.0);
        Ok(source)
    }

    /// Implementation of [`renameNode`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Document3-renameNode) method.
    ///
    /// The node is always renamed in place, and handlers are called with
    /// [`OperationType::NodeRenamed`].
    /// A renamed Attribute stays on its owner element, and replaces an attribute
    /// that already has the new name.
    ///
    /// # Errors
    /// - `NotSupportedErr`: `node` is neither an Element nor an Attribute.
    /// - `WrongDocumentErr`: `node` belongs to another document.
    /// - `InvalidCharacterErr`, `NamespaceErr`: same as [`DocumentRef::create_element_ns`].
    pub fn rename_node(
        &mut self,
        node: NodeRef,
        namespace_uri: Option<&str>,
        qualified_name: &str,
    ) -> Result<NodeRef, DOMException> {
        if !matches!(node.node_type(), NodeType::Element | NodeType::Attribute) {
            return Err(DOMException::NotSupportedErr);
        }
        if !node
            .document_node()
            .is_some_and(|doc| doc.is_same_node(self.as_node_ref()))
        {
            return Err(DOMException::WrongDocumentErr);
        }
        check_qualified_name(namespace_uri, qualified_name)?;

        let namespace_uri = namespace_uri.filter(|uri| !uri.is_empty());
        let (prefix, local_name) = split_prefix_local(qualified_name);
        {
            let mut record = node.record_mut();
            record.node_name = qualified_name.into();
            record.namespace_uri = namespace_uri.map(Rc::from);
            record.prefix = prefix.map(Rc::from);
            record.local_name = local_name.map(Rc::from);
        }
        if let Some(mut attributes) = node
            .as_attribute()
            .and_then(|attr| attr.owner_element())
            .and_then(|elem| elem.attributes())
        {
            attributes.set_named_item_ns(node.clone())?;
        }

        notify_user_data_handlers(&node, OperationType::NodeRenamed, Some(&node));
        Ok(node)
    }

    /// The number the next synthetic namespace prefix will use.
    pub fn namespace_index(&self) -> usize {
        self.with_context(|context| context.namespace_index)
    }

    /// Take the current number for a synthetic namespace prefix and advance the counter.
    pub(super) fn next_namespace_index(&self) -> usize {
        self.with_context_mut(|context| {
            let index = context.namespace_index;
            context.namespace_index += 1;
            index
        })
    }

    /// Implementation of [`normalizeDocument`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Document3-normalizeDocument) method.
    ///
    /// # Specification
    /// ```text
    /// This method acts as if the document was going through a save and load cycle,
    /// putting the document in a "normal" form. As a consequence, this method updates
    /// the replacement tree of EntityReference nodes and normalizes Text nodes, as
    /// defined in the method Node.normalize().
    /// Otherwise, the actual result depends on the features being set on the
    /// Document.domConfig object and governing what operations actually take place.
    /// ```
    ///
    /// The parameters `comments`, `cdata-sections`, `namespaces` and
    /// `namespace-declarations` are applied in this order, then Text nodes are merged.
    /// Namespace errors are passed to `error-handler`. If the handler returns `false`,
    /// namespace normalization stops, but the other steps are still applied.
    pub fn normalize_document(&mut self) {
        let config = self.dom_config();

        if !config.comments() {
            #[cfg(feature = "tracing")]
            tracing::trace!("normalize_document: remove comments");
            for comment in self.descendants_of_kind(NodeType::Comment) {
                if let Some(mut parent) = comment.parent_node() {
                    let _ = parent.remove_child(comment);
                }
            }
        }

        if !config.cdata_sections() {
            #[cfg(feature = "tracing")]
            tracing::trace!("normalize_document: replace CDATA sections by text");
            for cdata in self.descendants_of_kind(NodeType::CDATASection) {
                let data = cdata.character_data().unwrap_or_default();
                if let Some(mut parent) = cdata.parent_node() {
                    let text = self.create_text_node(&data);
                    let _ = parent.replace_child(text.into(), cdata);
                }
            }
        }

        if config.namespaces() {
            if let Some(mut root) = self.document_element() {
                #[cfg(feature = "tracing")]
                tracing::trace!("normalize_document: normalize namespaces");
                match config.error_handler() {
                    Some(handler) => root.normalize_namespaces_with(handler.as_ref()),
                    None => root.normalize_namespaces_with(&|_: DOMError| true),
                };
            }
        }

        if !config.namespace_declarations() {
            #[cfg(feature = "tracing")]
            tracing::trace!("normalize_document: remove namespace declarations");
            for elem in self.descendants_of_kind(NodeType::Element) {
                if let Some(mut attributes) = elem.attributes() {
                    attributes.retain(|attr| !is_namespace_declaration(attr));
                }
            }
        }

        self.normalize();
    }

    /// Nodes of `kind` in the tree of this document, in document order.
    fn descendants_of_kind(&self, kind: NodeType) -> Vec<NodeRef> {
        let mut found = vec![];
        let mut current = self.0.following_in(&self.0);
        while let Some(node) = current {
            if node.node_type() == kind {
                found.push(node.clone());
            }
            current = node.following_in(&self.0);
        }
        found
    }
}

/// Check if `attr` is an `xmlns` or `xmlns:prefix` attribute.
pub(super) fn is_namespace_declaration(attr: &NodeRef) -> bool {
    attr.namespace_uri().as_deref() == Some(XML_NS_NAMESPACE)
        || attr.prefix().as_deref() == Some("xmlns")
        || (attr.prefix().is_none() && attr.local_name().as_deref() == Some("xmlns"))
}
