//! Implement [Document Object Model (DOM) Level 3 Core](https://www.w3.org/TR/DOM-Level-3-Core/).
//!
//! Every node is stored in one tagged record and reached through [`NodeRef`](node::NodeRef)
//! or one of the typed handles (`ElementRef`, `AttrRef`, ...).
//! All typed handles implement [`Node`](node::Node), so the tree operations are
//! available on each of them.
//!
//! Namespace declarations and prefixes can be repaired after programmatic mutation by
//! [`ElementRef::normalize_namespaces`](element::ElementRef::normalize_namespaces)
//! or [`DocumentRef::normalize_document`](document::DocumentRef::normalize_document).
//!
//! # Note
//! - The iterators that walk through the nodes of the DOM are not implemented.\
//!   Each node can modify the whole DOM tree, so `child_nodes` and
//!   `get_elements_by_tag_name` return snapshots.
//! - Attribute values are held directly by the attribute node, not as child nodes.

use std::fmt;

use crate::qname::{split_qname2, validate_qname};

use node::Node;

pub mod attr;
pub mod binding_scope;
pub mod character_data;
pub mod configuration;
pub mod document;
pub mod document_fragment;
pub mod document_type;
pub mod dom_error;
pub mod dom_implementation;
pub mod element;
pub mod entity;
pub mod entity_reference;
pub mod named_node_map;
pub mod namespace;
pub mod node;
pub mod notation;
pub mod pi;
pub mod user_data;

/// This is the namespace for the special xml: prefix predefined in the
/// XML Namespace specification.
pub const XML_XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
/// The reserved namespace of namespace declaration attributes.
pub const XML_NS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Implementation of [DOMException](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-17189187)
/// interface on [1.4 Fundamental Interfaces: Core Module](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-BBACDC08)
///
/// Although named “Exception”,
/// it merely inherits its name from the specification and is in fact just an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DOMException {
    /// If index or size is negative, or greater than the allowed value.
    IndexSizeErr = 1,
    /// If the specified range of text does not fit into a DOMString.
    DOMStringSizeErr = 2,
    /// If any Node is inserted somewhere it doesn't belong.
    HierarchyRequestErr = 3,
    /// If a Node is used in a different document than the one that created it
    /// (that doesn't support it).
    WrongDocumentErr = 4,
    /// If an invalid or illegal character is specified, such as in an XML name.
    InvalidCharacterErr = 5,
    /// If data is specified for a Node which does not support data.
    NoDataAllowedErr = 6,
    /// If an attempt is made to modify an object where modifications are not allowed.
    NoModificationAllowedErr = 7,
    /// If an attempt is made to reference a Node in a context where it does not exist.
    NotFoundErr = 8,
    /// If the implementation does not support the requested type of object or operation.
    NotSupportedErr = 9,
    /// If an attempt is made to add an attribute that is already in use elsewhere.
    InuseAttributeErr = 10,
    /// If an attempt is made to use an object that is not, or is no longer, usable.
    InvalidStateErr = 11,
    /// If an invalid or illegal string is specified.
    SyntaxErr = 12,
    /// If an attempt is made to modify the type of the underlying object.
    InvalidModificationErr = 13,
    /// If an attempt is made to create or change an object in a way which is incorrect with
    /// regard to namespaces.
    NamespaceErr = 14,
    /// If a parameter or an operation is not supported by the underlying object.
    InvalidAccessErr = 15,
    /// If a call to a method such as insertBefore or removeChild would make the Node invalid
    /// with respect to "partial validity".
    ValidationErr = 16,
    /// If the type of an object is incompatible with the expected type of the parameter
    /// associated to the object.
    TypeMismatchErr = 17,
}

impl DOMException {
    /// The numeric exception code.
    pub fn code(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for DOMException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use DOMException::*;
        let msg = match self {
            IndexSizeErr => "index or size is out of range",
            DOMStringSizeErr => "text does not fit into a string",
            HierarchyRequestErr => "node cannot be inserted at this position",
            WrongDocumentErr => "node belongs to a different document",
            InvalidCharacterErr => "invalid character in a name",
            NoDataAllowedErr => "node does not support data",
            NoModificationAllowedErr => "node is read-only",
            NotFoundErr => "node was not found",
            NotSupportedErr => "operation is not supported",
            InuseAttributeErr => "attribute is in use by another element",
            InvalidStateErr => "object is not usable",
            SyntaxErr => "invalid string",
            InvalidModificationErr => "type of the object cannot be modified",
            NamespaceErr => "operation is incorrect with regard to namespaces",
            InvalidAccessErr => "operation is not supported by the object",
            ValidationErr => "operation would make the node invalid",
            TypeMismatchErr => "type mismatch",
        };
        write!(f, "{msg} (DOMException code {})", self.code())
    }
}

impl std::error::Error for DOMException {}

/// The two nodes are disconnected.\
/// Order between disconnected nodes is always implementation-specific.
const DOCUMENT_POSITION_DISCONNECTED: u16 = 0x01;
/// The second node precedes the reference node.
const DOCUMENT_POSITION_PRECEDING: u16 = 0x02;
/// The node follows the reference node.
const DOCUMENT_POSITION_FOLLOWING: u16 = 0x04;
/// The node contains the reference node.\
/// A node which contains is always preceding, too.
const DOCUMENT_POSITION_CONTAINS: u16 = 0x08;
/// The node is contained by the reference node.\
/// A node which is contained is always following, too.
const DOCUMENT_POSITION_CONTAINED_BY: u16 = 0x10;
/// The determination of preceding versus following is implementation-specific.
const DOCUMENT_POSITION_IMPLEMENTATION_SPECIFIC: u16 = 0x20;

/// Constants `DocumentPosition` in [Interface Node](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1950641247).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentPosition(u16);

impl DocumentPosition {
    fn new() -> Self {
        DocumentPosition(0)
    }

    fn set_flag(mut self, flag: u16) -> Self {
        self.0 |= flag;
        self
    }

    pub fn is_same_node(self) -> bool {
        self.0 == 0
    }

    pub fn is_disconnected(self) -> bool {
        self.0 & DOCUMENT_POSITION_DISCONNECTED != 0
    }

    pub fn is_preceding(self) -> bool {
        self.0 & DOCUMENT_POSITION_PRECEDING != 0
    }

    pub fn is_following(self) -> bool {
        self.0 & DOCUMENT_POSITION_FOLLOWING != 0
    }

    pub fn is_contains(self) -> bool {
        self.0 & DOCUMENT_POSITION_CONTAINS != 0
    }

    pub fn is_contained_by(self) -> bool {
        self.0 & DOCUMENT_POSITION_CONTAINED_BY != 0
    }

    pub fn is_implementation_specific(self) -> bool {
        self.0 & DOCUMENT_POSITION_IMPLEMENTATION_SPECIFIC != 0
    }
}

impl From<DocumentPosition> for u16 {
    fn from(value: DocumentPosition) -> Self {
        value.0
    }
}

/// Constants `NodeType` in [Interface Node](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1950641247).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeType {
    Element = 1,
    Attribute = 2,
    Text = 3,
    CDATASection = 4,
    EntityReference = 5,
    Entity = 6,
    ProcessingInstruction = 7,
    Comment = 8,
    Document = 9,
    DocumentType = 10,
    DocumentFragment = 11,
    Notation = 12,
}

/// Return `true` if `parent` and `child` are allowed to be parent and child.
/// Otherwise, return `false`.
///
/// [1.1.1 The DOM Structure Model](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1590626202)
///
/// | NodeType              | Description                                                                               |
/// | :-------------------- | :---------------------------------------------------------------------------------------- |
/// | Document              | Element (maximum of one), ProcessingInstruction, Comment, DocumentType (maximum of one)   |
/// | DocumentFragment      | Element, ProcessingInstruction, Comment, Text, CDATASection, EntityReference              |
/// | DocumentType          | no children                                                                               |
/// | EntityReference       | Element, ProcessingInstruction, Comment, Text, CDATASection, EntityReference              |
/// | Element               | Element, ProcessingInstruction, Comment, Text, CDATASection, EntityReference              |
/// | Attr                  | no children (the value is stored in the node)                                             |
/// | ProcessingInstruction | no children                                                                               |
/// | Comment               | no children                                                                               |
/// | Text                  | no children                                                                               |
/// | CDATASection          | no children                                                                               |
/// | Entity                | Element, ProcessingInstruction, Comment, Text, CDATASection, EntityReference              |
/// | Notation              | no children                                                                               |
fn check_vertical_hierarchy(parent: NodeType, child: NodeType) -> bool {
    use NodeType::*;
    match parent {
        Element | DocumentFragment | EntityReference | Entity => matches!(
            child,
            Element | Text | Comment | ProcessingInstruction | CDATASection | EntityReference
        ),
        Document => matches!(
            child,
            Element | ProcessingInstruction | Comment | DocumentType
        ),
        _ => false,
    }
}

/// Check if the nodes belong to the same document or not.
///
/// A Document belongs to itself.
/// A DocumentType that is not attached to any document belongs to every document.
fn check_owner_document_sameness(l: &impl Node, r: &impl Node) -> bool {
    let ldoc = l.as_node_ref().document_node();
    let rdoc = r.as_node_ref().document_node();
    match (ldoc, rdoc) {
        (Some(l), Some(r)) => l.is_same_node(&r),
        (None, None) => true,
        (None, _) => l.node_type() == NodeType::DocumentType,
        (_, None) => r.node_type() == NodeType::DocumentType,
    }
}

/// Check a qualified name and its namespace URI as `createElementNS` and
/// `createAttributeNS` do. An empty `namespace_uri` is treated as `None`.
///
/// # Errors
/// - `InvalidCharacterErr`: `qualified_name` is not a QName.
/// - `NamespaceErr`: the prefix has no namespace URI, `xml` is not bound to the XML
///   namespace, or `xmlns` and the xmlns namespace are not used together.
fn check_qualified_name(
    namespace_uri: Option<&str>,
    qualified_name: &str,
) -> Result<(), DOMException> {
    if validate_qname(qualified_name).is_err() {
        return Err(DOMException::InvalidCharacterErr);
    }

    let namespace_uri = namespace_uri.filter(|uri| !uri.is_empty());
    let prefix = split_qname2(qualified_name).map(|(prefix, _)| prefix);
    let is_xmlns = prefix == Some("xmlns") || qualified_name == "xmlns";
    match namespace_uri {
        // ... if the qualifiedName has a prefix and the namespaceURI is null, ...
        None if prefix.is_some() || is_xmlns => Err(DOMException::NamespaceErr),
        None => Ok(()),
        // ... if the qualifiedName has a prefix that is "xml"
        // and the namespaceURI is different from "http://www.w3.org/XML/1998/namespace" ...
        Some(uri) if prefix == Some("xml") && uri != XML_XML_NAMESPACE => {
            Err(DOMException::NamespaceErr)
        }
        // ... if the qualifiedName or its prefix is "xmlns"
        // and the namespaceURI is different from "http://www.w3.org/2000/xmlns/" ...
        // ... if the namespaceURI is "http://www.w3.org/2000/xmlns/"
        // and neither the qualifiedName nor its prefix is "xmlns".
        Some(uri) if is_xmlns != (uri == XML_NS_NAMESPACE) => Err(DOMException::NamespaceErr),
        Some(_) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dom_exception_code_test() {
        assert_eq!(DOMException::HierarchyRequestErr.code(), 3);
        assert_eq!(DOMException::NotFoundErr.code(), 8);
        assert_eq!(DOMException::NamespaceErr.code(), 14);
        let msg = DOMException::NotSupportedErr.to_string();
        assert!(msg.contains("code 9"), "{msg}");
    }

    #[test]
    fn vertical_hierarchy_test() {
        use NodeType::*;
        assert!(check_vertical_hierarchy(Element, Text));
        assert!(check_vertical_hierarchy(Document, DocumentType));
        assert!(!check_vertical_hierarchy(Document, Text));
        assert!(!check_vertical_hierarchy(Text, Text));
        assert!(!check_vertical_hierarchy(Element, Attribute));
        assert!(!check_vertical_hierarchy(Element, Document));
        assert!(!check_vertical_hierarchy(Attribute, Text));
    }

    #[test]
    fn check_qualified_name_test() {
        assert!(check_qualified_name(None, "a").is_ok());
        assert!(check_qualified_name(Some(""), "a").is_ok());
        assert!(check_qualified_name(Some("urn:x"), "p:a").is_ok());
        assert!(check_qualified_name(Some(XML_XML_NAMESPACE), "xml:lang").is_ok());
        assert!(check_qualified_name(Some(XML_NS_NAMESPACE), "xmlns").is_ok());
        assert!(check_qualified_name(Some(XML_NS_NAMESPACE), "xmlns:p").is_ok());

        let err = Err(DOMException::NamespaceErr);
        assert_eq!(check_qualified_name(None, "p:a"), err);
        assert_eq!(check_qualified_name(Some("urn:x"), "xml:a"), err);
        assert_eq!(check_qualified_name(Some("urn:x"), "xmlns"), err);
        assert_eq!(check_qualified_name(Some("urn:x"), "xmlns:p"), err);
        assert_eq!(check_qualified_name(Some(XML_NS_NAMESPACE), "p:a"), err);
        assert_eq!(check_qualified_name(None, "xmlns"), err);
        assert_eq!(
            check_qualified_name(Some("urn:x"), "p:"),
            Err(DOMException::InvalidCharacterErr)
        );
    }
}
