//! An in-memory [DOM Level 3 Core](https://www.w3.org/TR/DOM-Level-3-Core/) tree
//! with namespace normalization.
//!
//! Nodes are shared handles ([`dom::node::NodeRef`] and typed wrappers such as
//! [`dom::element::ElementRef`]). A parent owns its children, while parent, previous
//! sibling, owner document and owner element are weak references.
//!
//! Handles are not `Send`. A document must be accessed from one thread at a time.

pub mod dom;
pub(crate) mod qname;
