use std::rc::Rc;

use super::node::{NodeData, NodeRef, impl_node_handle};

/// Payload of a Notation node.
#[derive(Clone)]
pub(crate) struct NotationData {
    public_id: Option<Rc<str>>,
    system_id: Option<Rc<str>>,
}

impl_node_handle!(
    /// Implementation of [Notation](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-5431D1B9)
    /// interface on [1.5 Extended Interfaces: XML Module](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-E067D597)
    NotationRef,
    Notation,
    as_notation
);

impl NotationRef {
    pub(super) fn create(
        owner_document: Option<&NodeRef>,
        name: Rc<str>,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Self {
        let data = NotationData {
            public_id: public_id.map(Rc::from),
            system_id: system_id.map(Rc::from),
        };
        NotationRef(NodeRef::create(owner_document, name, None, |_| {
            NodeData::Notation(data)
        }))
    }

    /// Implementation of [`publicId`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-54F2B4D0) attribute.
    pub fn public_id(&self) -> Option<Rc<str>> {
        match &self.0.record().data {
            NodeData::Notation(notation) => notation.public_id.clone(),
            _ => None,
        }
    }

    /// Implementation of [`systemId`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-E8AAB1D0) attribute.
    pub fn system_id(&self) -> Option<Rc<str>> {
        match &self.0.record().data {
            NodeData::Notation(notation) => notation.system_id.clone(),
            _ => None,
        }
    }
}
