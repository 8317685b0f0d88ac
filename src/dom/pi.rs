use std::rc::Rc;

use super::node::{Node, NodeData, NodeRef, impl_node_handle};

impl_node_handle!(
    /// Implementation of [ProcessingInstruction](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1004215813)
    /// interface on [1.5 Extended Interfaces: XML Module](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-E067D597)
    ProcessingInstructionRef,
    ProcessingInstruction,
    as_processing_instruction
);

impl ProcessingInstructionRef {
    /// Create a detached processing instruction.
    ///
    /// This method does not validate `target`.
    pub(super) fn create(
        owner_document: Option<&NodeRef>,
        target: Rc<str>,
        data: impl Into<String>,
    ) -> Self {
        let data = data.into();
        ProcessingInstructionRef(NodeRef::create(owner_document, target, None, |_| {
            NodeData::ProcessingInstruction(data)
        }))
    }

    /// Implementation of [`target`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1478689192) attribute.\
    /// Same as `nodeName`.
    pub fn target(&self) -> Rc<str> {
        self.node_name()
    }

    /// Implementation of [`data`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-837822393) attribute.
    pub fn data(&self) -> String {
        self.0.character_data().unwrap_or_default()
    }

    pub fn set_data(&mut self, data: impl Into<String>) {
        let data = data.into();
        self.0.with_character_data_mut(|current| *current = data);
    }
}
