use std::{borrow::Cow, fmt};

use super::node::NodeRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DOMErrorSeverity {
    SeverityWarning = 1,
    SeverityError = 2,
    SeverityFatalError = 3,
}

/// The kind of problem reported by namespace normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DOMErrorType {
    /// A declaration binds the xmlns namespace, or declares the `xmlns` prefix.
    NamespaceReassignment,
    /// An Element or Attribute has neither a local name nor a namespace URI.
    MissingLocalName,
    /// A prefix is used but is not bound in scope.
    UnboundPrefix,
    /// A namespace declaration could not be added to an Element.
    DeclarationFailed,
}

impl DOMErrorType {
    /// The `DOMError.type` string.
    pub fn as_str(&self) -> &'static str {
        match self {
            DOMErrorType::NamespaceReassignment => "namespace-reassignment",
            DOMErrorType::MissingLocalName => "missing-local-name",
            DOMErrorType::UnboundPrefix => "unbound-prefix",
            DOMErrorType::DeclarationFailed => "declaration-failed",
        }
    }
}

impl fmt::Display for DOMErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Implementation of [`Interface DOMError`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ERROR-Interfaces-DOMError).
///
/// # Specification
/// ```text
/// Interface DOMError (introduced in DOM Level 3)
///     DOMError is an interface that describes an error.
/// ```
#[derive(Debug, Clone)]
pub struct DOMError {
    severity: DOMErrorSeverity,
    error_type: DOMErrorType,
    message: Cow<'static, str>,
    related_node: Option<NodeRef>,
}

impl DOMError {
    pub(super) fn new(
        severity: DOMErrorSeverity,
        error_type: DOMErrorType,
        message: impl Into<Cow<'static, str>>,
        related_node: Option<NodeRef>,
    ) -> Self {
        Self {
            severity,
            error_type,
            message: message.into(),
            related_node,
        }
    }

    pub fn severity(&self) -> DOMErrorSeverity {
        self.severity
    }

    pub fn error_type(&self) -> DOMErrorType {
        self.error_type
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// The node closest to where the error occurred.
    pub fn related_node(&self) -> Option<&NodeRef> {
        self.related_node.as_ref()
    }
}

impl fmt::Display for DOMError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)
    }
}

/// Implementation of [`Interface DOMErrorHandler`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ERROR-Interfaces-DOMErrorHandler).
///
/// # Specification
/// ```text
/// Interface DOMErrorHandler (introduced in DOM Level 3)
///     DOMErrorHandler is a callback interface that the DOM implementation can call
///     when reporting errors that happens while processing XML data, or when doing
///     some other processing (e.g. validating a document). A DOMErrorHandler object
///     can be attached to a Document using the "error-handler" on the DOMConfiguration
///     interface.
/// ```
pub trait DOMErrorHandler {
    /// Implementation of [`handleError`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-ERRORS-DOMErrorHandler-handleError) method.
    ///
    /// # Specification
    /// ```text
    /// Return Value
    ///     boolean If the handleError method returns false, the DOM implementation should
    ///             stop the current processing when possible. If the method returns true,
    ///             the processing may continue depending on DOMError.severity.
    /// ```
    fn handle_error(&self, error: DOMError) -> bool;
}

impl<F: Fn(DOMError) -> bool> DOMErrorHandler for F {
    fn handle_error(&self, error: DOMError) -> bool {
        self(error)
    }
}
