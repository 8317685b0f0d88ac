use std::{any::Any, rc::Rc};

use super::node::NodeRef;

/// Implementation of [`DOMUserData`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-DOMUserData) type.
///
/// Any application object can be attached to a node.
pub type DOMUserData = Rc<dyn Any>;

/// Constants `OperationType` in [Interface UserDataHandler](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#UserDataHandler).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OperationType {
    /// The node is cloned, using `Node.cloneNode()`.
    NodeCloned = 1,
    /// The node is imported, using `Document.importNode()`.
    NodeImported = 2,
    /// The node is deleted.
    ///
    /// Nodes are released when their last handle is dropped and no handler is
    /// called at that time, so this operation is never delivered.
    NodeDeleted = 3,
    /// The node is renamed, using `Document.renameNode()`.
    NodeRenamed = 4,
    /// The node is adopted, using `Document.adoptNode()`, or moved into a tree of
    /// another document.
    NodeAdopted = 5,
}

/// Implementation of [Interface UserDataHandler](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#UserDataHandler).
///
/// # Specification
/// ```text
/// When associating an object to a key on a node using Node.setUserData() the
/// application can provide a handler that gets called when the node the object is
/// associated to is being cloned, imported, or renamed. This can be used by the
/// application to implement various behaviors regarding the data it associates to
/// the DOM nodes.
/// ```
pub trait UserDataHandler {
    /// Implementation of [`handle`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#ID-handleUserDataEvent) method.
    ///
    /// `src` is the node being operated on, `dst` is the node created by the
    /// operation, if any.
    fn handle(
        &self,
        operation: OperationType,
        key: &str,
        data: DOMUserData,
        src: Option<NodeRef>,
        dst: Option<NodeRef>,
    );
}

impl<F> UserDataHandler for F
where
    F: Fn(OperationType, &str, DOMUserData, Option<NodeRef>, Option<NodeRef>),
{
    fn handle(
        &self,
        operation: OperationType,
        key: &str,
        data: DOMUserData,
        src: Option<NodeRef>,
        dst: Option<NodeRef>,
    ) {
        self(operation, key, data, src, dst)
    }
}

/// Call the handlers registered on `node` for `operation`.
///
/// Entries are collected first, so handlers may freely access the tree.
pub(super) fn notify_user_data_handlers(
    node: &NodeRef,
    operation: OperationType,
    dst: Option<&NodeRef>,
) {
    let entries = {
        let record = node.record();
        let Some(table) = record.user_data.as_ref() else {
            return;
        };
        table
            .iter()
            .filter_map(|(key, (data, handler))| {
                handler
                    .clone()
                    .map(|handler| (key.clone(), data.clone(), handler))
            })
            .collect::<Vec<_>>()
    };
    for (key, data, handler) in entries {
        handler.handle(operation, &key, data, Some(node.clone()), dst.cloned());
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use crate::dom::{document::DocumentRef, node::Node};

    use super::*;

    #[test]
    fn user_data_handler_test() {
        let doc = DocumentRef::new(None, Some("root"), None).unwrap();
        let mut root = doc.document_element().unwrap();
        let calls = Rc::new(RefCell::new(vec![]));
        let log = calls.clone();
        let handler: Rc<dyn UserDataHandler> = Rc::new(
            move |op: OperationType, key: &str, _: DOMUserData, src: Option<NodeRef>, dst: Option<NodeRef>| {
                log.borrow_mut()
                    .push((op, key.to_owned(), src.is_some(), dst.is_some()));
            },
        );

        assert!(
            root.set_user_data("k", Some(Rc::new(1u32) as DOMUserData), Some(handler))
                .is_none()
        );
        let data = root.get_user_data("k").unwrap();
        assert_eq!(data.downcast_ref::<u32>(), Some(&1));

        let cloned = root.clone_node(false);
        // user data is carried by the copy
        assert!(cloned.get_user_data("k").is_some());
        assert_eq!(
            calls.borrow().as_slice(),
            [(OperationType::NodeCloned, "k".to_owned(), true, true)]
        );

        let previous = root.set_user_data("k", None, None).unwrap();
        assert_eq!(previous.downcast_ref::<u32>(), Some(&1));
        assert!(root.get_user_data("k").is_none());
    }
}
