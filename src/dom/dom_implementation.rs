use super::{
    DOMException,
    document::DocumentRef,
    document_type::DocumentTypeRef,
};

use crate::qname::validate_qname;

/// Implementation of [Interface DOMImplementation](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-102161490).
///
/// # Specification
/// ```text
/// The DOMImplementation interface provides a number of methods for performing
/// operations that are independent of any particular instance of the document object
/// model.
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DOMImplementation;

impl DOMImplementation {
    /// Implementation of [`hasFeature`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-5CED94D7) method.
    ///
    /// `Core` and `XML` are supported in versions `1.0`, `2.0` and `3.0`.
    /// A leading `+` of `feature` is ignored, and the comparison is case-insensitive.
    pub fn has_feature(&self, feature: &str, version: Option<&str>) -> bool {
        let feature = feature.strip_prefix('+').unwrap_or(feature);
        if !feature.eq_ignore_ascii_case("core") && !feature.eq_ignore_ascii_case("xml") {
            return false;
        }
        matches!(version, None | Some("" | "1.0" | "2.0" | "3.0"))
    }

    /// Implementation of [`createDocumentType`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Level-2-Core-DOM-createDocType) method.
    ///
    /// The returned node has no owner document until it is passed to
    /// [`DOMImplementation::create_document`].
    ///
    /// # Errors
    /// - `InvalidCharacterErr`: `qualified_name` is not a QName.
    pub fn create_document_type(
        &self,
        qualified_name: &str,
        public_id: Option<&str>,
        system_id: Option<&str>,
    ) -> Result<DocumentTypeRef, DOMException> {
        if validate_qname(qualified_name).is_err() {
            return Err(DOMException::InvalidCharacterErr);
        }
        Ok(DocumentTypeRef::create(
            None,
            qualified_name.into(),
            public_id,
            system_id,
        ))
    }

    /// Implementation of [`createDocument`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Level-2-Core-DOM-createDocument) method.
    ///
    /// Same as [`DocumentRef::new`].
    pub fn create_document(
        &self,
        namespace_uri: Option<&str>,
        qualified_name: Option<&str>,
        doctype: Option<DocumentTypeRef>,
    ) -> Result<DocumentRef, DOMException> {
        DocumentRef::new(namespace_uri, qualified_name, doctype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_feature_test() {
        let imp = DOMImplementation;
        assert!(imp.has_feature("Core", None));
        assert!(imp.has_feature("XML", Some("3.0")));
        assert!(imp.has_feature("+xml", Some("")));
        assert!(imp.has_feature("core", Some("1.0")));
        assert!(!imp.has_feature("Core", Some("4.0")));
        assert!(!imp.has_feature("HTML", None));
    }

    #[test]
    fn create_document_type_test() {
        assert_eq!(
            DOMImplementation.create_document_type("a b", None, None),
            Err(DOMException::InvalidCharacterErr)
        );
        let doctype = DOMImplementation
            .create_document_type("svg:svg", None, Some("svg.dtd"))
            .unwrap();
        assert_eq!(doctype.system_id().as_deref(), Some("svg.dtd"));
    }
}
