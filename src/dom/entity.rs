use std::rc::Rc;

use super::node::{NodeData, NodeRef, impl_node_handle};

/// Payload of an Entity node.
#[derive(Clone)]
pub(crate) struct EntityData {
    /// Implementation of `publicId` attribute.
    public_id: Option<Rc<str>>,
    /// Implementation of `systemId` attribute.
    system_id: Option<Rc<str>>,
    /// Implementation of `notationName` attribute.
    /// `None` for parsed entities.
    notation_name: Option<Rc<str>>,
}

impl_node_handle!(
    /// Implementation of [Entity](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-527DCFF2)
    /// interface on [1.5 Extended Interfaces: XML Module](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-E067D597)
    ///
    /// The replacement text, if any, is held as children.
    EntityRef,
    Entity,
    as_entity
);

impl EntityRef {
    pub(super) fn create(
        owner_document: Option<&NodeRef>,
        name: Rc<str>,
        public_id: Option<&str>,
        system_id: Option<&str>,
        notation_name: Option<&str>,
    ) -> Self {
        let data = EntityData {
            public_id: public_id.map(Rc::from),
            system_id: system_id.map(Rc::from),
            notation_name: notation_name.map(Rc::from),
        };
        EntityRef(NodeRef::create(owner_document, name, None, |_| {
            NodeData::Entity(data)
        }))
    }

    fn with_data<R>(&self, f: impl FnOnce(&EntityData) -> R) -> R {
        match &self.0.record().data {
            NodeData::Entity(entity) => f(entity),
            _ => unreachable!("EntityRef always wraps an Entity node"),
        }
    }

    pub fn public_id(&self) -> Option<Rc<str>> {
        self.with_data(|entity| entity.public_id.clone())
    }

    pub fn system_id(&self) -> Option<Rc<str>> {
        self.with_data(|entity| entity.system_id.clone())
    }

    pub fn notation_name(&self) -> Option<Rc<str>> {
        self.with_data(|entity| entity.notation_name.clone())
    }
}
