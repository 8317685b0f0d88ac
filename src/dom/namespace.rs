//! Namespace normalization.
//!
//! Based on [Appendix B: Namespace Normalization](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/namespaces-algorithms.html#normalizeDocumentAlgo)
//! of DOM Level 3 Core.\
//! Each Element is visited in preorder:
//!
//! 1. Its BindingScope is rebuilt from its `xmlns` and `xmlns:prefix` attributes.
//! 2. Its own namespace URI is checked against the bindings in scope. A missing
//!    declaration is added to the element.
//! 3. Each attribute with a namespace URI gets a prefix bound to that URI, reusing
//!    a prefix in scope, declaring its own prefix, or declaring a new `NS<k>` prefix.
//! 4. Its Element children are visited.
//!
//! Problems are reported to a [`DOMErrorHandler`] and do not stop the process
//! unless the handler returns `false`.

use std::{cell::RefCell, ops::ControlFlow};

use super::{
    XML_NS_NAMESPACE,
    binding_scope::{BindingScope, find_binding, find_prefix},
    document::{DocumentRef, is_namespace_declaration},
    dom_error::{DOMError, DOMErrorHandler, DOMErrorSeverity, DOMErrorType},
    element::ElementRef,
    node::{Node, NodeRef},
};

impl ElementRef {
    /// Normalize the namespace declarations and prefixes of this element and
    /// its descendant elements.
    ///
    /// Declarations of the ancestors are taken into account.\
    /// Return the problems found, in document order.
    ///
    /// # Example
    /// ```
    /// use exdom::dom::{document::DocumentRef, node::Node};
    ///
    /// let doc = DocumentRef::new(None, Some("root"), None).unwrap();
    /// let mut root = doc.document_element().unwrap();
    /// root.set_attribute_ns(Some("urn:y"), "attr", "value").unwrap();
    ///
    /// assert!(root.normalize_namespaces().is_empty());
    /// assert_eq!(root.get_attribute("xmlns:NS1").as_deref(), Some("urn:y"));
    /// assert_eq!(
    ///     root.get_attribute_node_ns(Some("urn:y"), "attr").unwrap().prefix().as_deref(),
    ///     Some("NS1")
    /// );
    /// ```
    pub fn normalize_namespaces(&mut self) -> Vec<DOMError> {
        let errors = RefCell::new(vec![]);
        self.normalize_namespaces_with(&|error: DOMError| {
            errors.borrow_mut().push(error);
            true
        });
        errors.into_inner()
    }

    /// Same as [`ElementRef::normalize_namespaces`], but problems are passed to `handler`.
    ///
    /// Return `false` if `handler` stopped the process.
    pub fn normalize_namespaces_with(&mut self, handler: &dyn DOMErrorHandler) -> bool {
        let mut normalizer = Normalizer::new(self, handler);
        let mut ancestors = vec![];
        let mut current = self.as_node_ref().ancestor_element();
        while let Some(ancestor) = current.and_then(|node| node.as_element()) {
            current = ancestor.as_node_ref().ancestor_element();
            ancestors.push(ancestor);
        }
        for ancestor in ancestors.iter().rev() {
            let _ = normalizer.collect_bindings(ancestor, false);
        }
        normalizer.normalize(self).is_continue()
    }
}

struct Normalizer<'a> {
    handler: &'a dyn DOMErrorHandler,
    document: Option<DocumentRef>,
    /// Counter for synthetic prefixes of elements without owner document.
    detached_index: usize,
}

impl<'a> Normalizer<'a> {
    fn new(root: &ElementRef, handler: &'a dyn DOMErrorHandler) -> Self {
        Self {
            handler,
            document: root.owner_document(),
            detached_index: 0,
        }
    }

    fn report(
        &self,
        error_type: DOMErrorType,
        message: String,
        related_node: &NodeRef,
    ) -> ControlFlow<()> {
        #[cfg(feature = "tracing")]
        tracing::warn!(%error_type, node = %related_node.node_name(), "{message}");
        let error = DOMError::new(
            error_type.severity(),
            error_type,
            message,
            Some(related_node.clone()),
        );
        if self.handler.handle_error(error) {
            ControlFlow::Continue(())
        } else {
            ControlFlow::Break(())
        }
    }

    fn normalize(&mut self, element: &ElementRef) -> ControlFlow<()> {
        #[cfg(feature = "tracing")]
        tracing::trace!(element = %element.node_name(), "normalize namespaces");
        self.collect_bindings(element, true)?;
        self.fix_element(element)?;
        self.fix_attributes(element)?;

        for child in element.child_nodes() {
            if let Some(child) = child.as_element() {
                self.normalize(&child)?;
            }
        }
        ControlFlow::Continue(())
    }

    /// Rebuild the BindingScope of `element` from its declarations.
    ///
    /// If `visiting` is `false`, `element` is an ancestor of the normalized subtree:
    /// rejected declarations are not reported and attributes are left untouched.
    fn collect_bindings(&self, element: &ElementRef, visiting: bool) -> ControlFlow<()> {
        element.with_bindings_mut(BindingScope::clear);
        let attributes = element
            .attributes()
            .map(|attrs| attrs.items())
            .unwrap_or_default();
        for attr in attributes {
            if !is_namespace_declaration(&attr) {
                continue;
            }
            // `xmlns:prefix` declares `prefix`, `xmlns` the default namespace.
            let declared = if attr.prefix().as_deref() == Some("xmlns") {
                match attr.local_name() {
                    Some(local_name) => Some(local_name),
                    None if visiting => {
                        self.report(
                            DOMErrorType::MissingLocalName,
                            format!("the declaration '{}' has no prefix", attr.node_name()),
                            &attr,
                        )?;
                        continue;
                    }
                    None => continue,
                }
            } else {
                None
            };
            let value = attr.node_value().unwrap_or_default();
            if value == XML_NS_NAMESPACE || declared.as_deref() == Some("xmlns") {
                if visiting {
                    self.report(
                        DOMErrorType::NamespaceReassignment,
                        format!(
                            "the declaration '{}=\"{value}\"' reassigns the xmlns namespace",
                            attr.node_name()
                        ),
                        &attr,
                    )?;
                }
                continue;
            }

            if visiting {
                attr.set_namespace_uri_unchecked(Some(XML_NS_NAMESPACE.into()));
            }
            element.with_bindings_mut(|bindings| bindings.add(declared.as_deref(), &value));
        }
        ControlFlow::Continue(())
    }

    /// Make sure that the namespace URI of `element` is declared in scope, or
    /// resolve it from the bindings if it has none.
    fn fix_element(&mut self, element: &ElementRef) -> ControlFlow<()> {
        let node = element.as_node_ref();
        let prefix = element.prefix();
        match element.namespace_uri() {
            Some(namespace_uri) => {
                if namespace_uri.as_ref() == XML_NS_NAMESPACE
                    || prefix.as_deref() == Some("xmlns")
                {
                    return self.report(
                        DOMErrorType::NamespaceReassignment,
                        format!(
                            "the element '{}' cannot use the xmlns namespace",
                            element.node_name()
                        ),
                        node,
                    );
                }
                if find_binding(node, prefix.as_deref()) != Some(namespace_uri.clone()) {
                    self.declare(element, prefix.as_deref(), &namespace_uri)?;
                }
            }
            None if element.local_name().is_none() => {
                return self.report(
                    DOMErrorType::MissingLocalName,
                    format!("the element '{}' has no local name", element.node_name()),
                    node,
                );
            }
            None => match find_binding(node, prefix.as_deref()) {
                Some(namespace_uri) => node.set_namespace_uri_unchecked(Some(namespace_uri)),
                None => {
                    if let Some(prefix) = prefix {
                        return self.report(
                            DOMErrorType::UnboundPrefix,
                            format!(
                                "the prefix '{prefix}' of the element '{}' is not bound",
                                element.node_name()
                            ),
                            node,
                        );
                    }
                }
            },
        }
        ControlFlow::Continue(())
    }

    /// Give each namespaced attribute of `element` a prefix that is bound to
    /// its namespace URI.
    fn fix_attributes(&mut self, element: &ElementRef) -> ControlFlow<()> {
        let node = element.as_node_ref();
        let attributes = element
            .attributes()
            .map(|attrs| attrs.items())
            .unwrap_or_default();
        for attr in attributes {
            if is_namespace_declaration(&attr) {
                continue;
            }
            let Some(namespace_uri) = attr.namespace_uri() else {
                if attr.local_name().is_none() {
                    self.report(
                        DOMErrorType::MissingLocalName,
                        format!("the attribute '{}' has no local name", attr.node_name()),
                        &attr,
                    )?;
                }
                continue;
            };

            let prefix = attr.prefix();
            let bound = prefix
                .as_deref()
                .map(|prefix| find_binding(node, Some(prefix)));
            if bound.as_ref().is_some_and(|uri| *uri == Some(namespace_uri.clone())) {
                continue;
            }

            if let Some(found) = find_prefix(node, &namespace_uri) {
                #[cfg(feature = "tracing")]
                tracing::debug!(attribute = %attr.node_name(), prefix = %found, "reuse a prefix in scope");
                attr.set_prefix_unchecked(Some(found));
                continue;
            }
            // the prefix of the attribute is unbound, so it can be declared here
            if let (Some(prefix), Some(None)) = (prefix.as_deref(), bound) {
                self.declare(element, Some(prefix), &namespace_uri)?;
                continue;
            }
            let prefix = self.synthesize_prefix(node);
            self.declare(element, Some(prefix.as_str()), &namespace_uri)?;
            #[cfg(feature = "tracing")]
            tracing::debug!(attribute = %attr.node_name(), %prefix, "assign a synthetic prefix");
            attr.set_prefix_unchecked(Some(prefix.into()));
        }
        ControlFlow::Continue(())
    }

    /// Add or overwrite the declaration of `prefix` on `element`, and record it
    /// in the BindingScope of `element`.
    ///
    /// If the declaration cannot be added, nothing is recorded and the failure is reported.
    fn declare(
        &self,
        element: &ElementRef,
        prefix: Option<&str>,
        namespace_uri: &str,
    ) -> ControlFlow<()> {
        let name = match prefix {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_owned(),
        };
        #[cfg(feature = "tracing")]
        tracing::debug!(element = %element.node_name(), %name, namespace_uri, "declare namespace");

        match element.get_attribute_node(&name) {
            Some(mut attr) => {
                attr.as_node_ref()
                    .set_namespace_uri_unchecked(Some(XML_NS_NAMESPACE.into()));
                attr.set_value(namespace_uri);
            }
            None => {
                let mut target = element.clone();
                let added = target.set_attribute_ns(Some(XML_NS_NAMESPACE), &name, namespace_uri);
                if let Err(err) = added {
                    return self.report(
                        DOMErrorType::DeclarationFailed,
                        format!("cannot declare '{name}=\"{namespace_uri}\"': {err}"),
                        element.as_node_ref(),
                    );
                }
            }
        }
        element.with_bindings_mut(|bindings| bindings.add(prefix, namespace_uri));
        ControlFlow::Continue(())
    }

    /// A new `NS<k>` prefix that is not bound in the scope of `element`.
    fn synthesize_prefix(&mut self, element: &NodeRef) -> String {
        loop {
            let index = match self.document.as_ref() {
                Some(document) => document.next_namespace_index(),
                None => {
                    self.detached_index += 1;
                    self.detached_index
                }
            };
            let prefix = format!("NS{index}");
            if find_binding(element, Some(prefix.as_str())).is_none() {
                return prefix;
            }
        }
    }
}

impl DOMErrorType {
    /// The severity used when normalization reports this type.
    fn severity(self) -> DOMErrorSeverity {
        match self {
            DOMErrorType::UnboundPrefix => DOMErrorSeverity::SeverityWarning,
            DOMErrorType::NamespaceReassignment
            | DOMErrorType::MissingLocalName
            | DOMErrorType::DeclarationFailed => {
                DOMErrorSeverity::SeverityError
            }
        }
    }
}
