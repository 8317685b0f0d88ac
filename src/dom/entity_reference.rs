use std::rc::Rc;

use super::node::{NodeData, NodeRef, impl_node_handle};

impl_node_handle!(
    /// Implementation of [EntityReference](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-11C98490)
    /// interface on [1.5 Extended Interfaces: XML Module](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-E067D597)
    ///
    /// The expansion is not computed. Children can be added like any container.
    EntityReferenceRef,
    EntityReference,
    as_entity_reference
);

impl EntityReferenceRef {
    pub(super) fn create(owner_document: Option<&NodeRef>, name: Rc<str>) -> Self {
        EntityReferenceRef(NodeRef::create(owner_document, name, None, |_| {
            NodeData::EntityReference
        }))
    }
}
