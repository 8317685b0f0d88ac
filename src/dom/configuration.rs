use std::{cell::RefCell, fmt, rc::Rc};

use super::{DOMException, dom_error::DOMErrorHandler};

/// The value of a configuration parameter.
#[derive(Clone)]
pub enum DOMConfigValue {
    Bool(bool),
    ErrorHandler(Option<Rc<dyn DOMErrorHandler>>),
}

impl fmt::Debug for DOMConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DOMConfigValue::Bool(value) => f.debug_tuple("Bool").field(value).finish(),
            DOMConfigValue::ErrorHandler(handler) => f
                .debug_tuple("ErrorHandler")
                .field(&handler.as_ref().map(|_| ".."))
                .finish(),
        }
    }
}

impl From<bool> for DOMConfigValue {
    fn from(value: bool) -> Self {
        DOMConfigValue::Bool(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Parameter {
    CanonicalForm,
    CDATASections,
    Comments,
    ErrorHandler,
    NamespaceDeclarations,
    Namespaces,
    NormalizeCharacters,
    Validate,
    WellFormed,
}

/// Recognized parameter names, in the form returned by
/// [`DOMConfiguration::parameter_names`].
const PARAMETER_NAMES: &[(&str, Parameter)] = &[
    ("canonical-form", Parameter::CanonicalForm),
    ("cdata-sections", Parameter::CDATASections),
    ("comments", Parameter::Comments),
    ("error-handler", Parameter::ErrorHandler),
    ("namespace-declarations", Parameter::NamespaceDeclarations),
    ("namespaces", Parameter::Namespaces),
    ("normalize-characters", Parameter::NormalizeCharacters),
    ("validate", Parameter::Validate),
    ("well-formed", Parameter::WellFormed),
];

impl Parameter {
    fn parse(name: &str) -> Result<Self, DOMException> {
        PARAMETER_NAMES
            .iter()
            .find(|(known, _)| known.eq_ignore_ascii_case(name))
            .map(|&(_, param)| param)
            .ok_or(DOMException::NotFoundErr)
    }

    /// The only value accepted by parameters whose behavior cannot be changed.
    fn fixed_value(self) -> Option<bool> {
        match self {
            Parameter::CanonicalForm | Parameter::NormalizeCharacters | Parameter::Validate => {
                Some(false)
            }
            Parameter::WellFormed => Some(true),
            _ => None,
        }
    }
}

struct Parameters {
    cdata_sections: bool,
    comments: bool,
    namespace_declarations: bool,
    namespaces: bool,
    error_handler: Option<Rc<dyn DOMErrorHandler>>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            cdata_sections: true,
            comments: true,
            namespace_declarations: true,
            namespaces: true,
            error_handler: None,
        }
    }
}

/// Implementation of [Interface DOMConfiguration](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#DOMConfiguration).
///
/// # Specification
/// ```text
/// The DOMConfiguration interface represents the configuration of a document and
/// maintains a table of recognized parameters. Using the configuration, it is possible
/// to change Document.normalizeDocument() behavior, such as replacing the CDATASection
/// nodes with Text nodes or specifying the type of the schema that must be used when
/// the validation of the Document is requested.
/// ```
///
/// Parameter names are case-insensitive.
/// Since the table is shared by `Rc`, clone means shallow copy.
#[derive(Clone, Default)]
pub struct DOMConfiguration(Rc<RefCell<Parameters>>);

impl DOMConfiguration {
    pub fn new() -> Self {
        Self::default()
    }

    /// A configuration with the same parameter values that is not shared with `self`.
    pub(super) fn deep_copy(&self) -> Self {
        let params = self.0.borrow();
        DOMConfiguration(Rc::new(RefCell::new(Parameters {
            cdata_sections: params.cdata_sections,
            comments: params.comments,
            namespace_declarations: params.namespace_declarations,
            namespaces: params.namespaces,
            error_handler: params.error_handler.clone(),
        })))
    }

    fn check(param: Parameter, value: &DOMConfigValue) -> Result<(), DOMException> {
        match (param, value) {
            (Parameter::ErrorHandler, DOMConfigValue::ErrorHandler(_)) => Ok(()),
            (Parameter::ErrorHandler, _) => Err(DOMException::TypeMismatchErr),
            (param, DOMConfigValue::Bool(value)) => match param.fixed_value() {
                Some(fixed) if fixed != *value => Err(DOMException::NotSupportedErr),
                _ => Ok(()),
            },
            _ => Err(DOMException::TypeMismatchErr),
        }
    }

    /// Implementation of [`setParameter`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#DOMConfiguration-property) method.
    ///
    /// # Errors
    /// - `NotFoundErr`: the parameter name is not recognized.
    /// - `NotSupportedErr`: the parameter is recognized but the value cannot be set.
    /// - `TypeMismatchErr`: the value type is incompatible with the parameter.
    pub fn set_parameter(
        &mut self,
        name: &str,
        value: impl Into<DOMConfigValue>,
    ) -> Result<(), DOMException> {
        let param = Parameter::parse(name)?;
        let value = value.into();
        Self::check(param, &value)?;

        let mut params = self.0.borrow_mut();
        match (param, value) {
            (Parameter::ErrorHandler, DOMConfigValue::ErrorHandler(handler)) => {
                params.error_handler = handler
            }
            (Parameter::CDATASections, DOMConfigValue::Bool(value)) => params.cdata_sections = value,
            (Parameter::Comments, DOMConfigValue::Bool(value)) => params.comments = value,
            (Parameter::NamespaceDeclarations, DOMConfigValue::Bool(value)) => {
                params.namespace_declarations = value
            }
            (Parameter::Namespaces, DOMConfigValue::Bool(value)) => params.namespaces = value,
            // fixed parameters, already checked
            _ => {}
        }
        Ok(())
    }

    /// Implementation of [`getParameter`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#DOMConfiguration-getParameter) method.
    ///
    /// # Errors
    /// - `NotFoundErr`: the parameter name is not recognized.
    pub fn get_parameter(&self, name: &str) -> Result<DOMConfigValue, DOMException> {
        let param = Parameter::parse(name)?;
        let params = self.0.borrow();
        Ok(match param {
            Parameter::ErrorHandler => DOMConfigValue::ErrorHandler(params.error_handler.clone()),
            Parameter::CDATASections => DOMConfigValue::Bool(params.cdata_sections),
            Parameter::Comments => DOMConfigValue::Bool(params.comments),
            Parameter::NamespaceDeclarations => DOMConfigValue::Bool(params.namespace_declarations),
            Parameter::Namespaces => DOMConfigValue::Bool(params.namespaces),
            Parameter::CanonicalForm
            | Parameter::NormalizeCharacters
            | Parameter::Validate
            | Parameter::WellFormed => DOMConfigValue::Bool(param.fixed_value().unwrap_or(false)),
        })
    }

    /// Implementation of [`canSetParameter`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#DOMConfiguration-canSetParameter) method.
    pub fn can_set_parameter(&self, name: &str, value: &DOMConfigValue) -> bool {
        Parameter::parse(name).is_ok_and(|param| Self::check(param, value).is_ok())
    }

    /// Implementation of [`parameterNames`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#DOMConfiguration-parameterNames) attribute.
    pub fn parameter_names(&self) -> Vec<&'static str> {
        PARAMETER_NAMES.iter().map(|(name, _)| *name).collect()
    }

    pub(super) fn namespaces(&self) -> bool {
        self.0.borrow().namespaces
    }

    pub(super) fn namespace_declarations(&self) -> bool {
        self.0.borrow().namespace_declarations
    }

    pub(super) fn comments(&self) -> bool {
        self.0.borrow().comments
    }

    pub(super) fn cdata_sections(&self) -> bool {
        self.0.borrow().cdata_sections
    }

    pub(super) fn error_handler(&self) -> Option<Rc<dyn DOMErrorHandler>> {
        self.0.borrow().error_handler.clone()
    }
}

#[cfg(test)]
mod tests {
    use crate::dom::dom_error::DOMError;

    use super::*;

    fn get_bool(config: &DOMConfiguration, name: &str) -> bool {
        match config.get_parameter(name).unwrap() {
            DOMConfigValue::Bool(value) => value,
            other => panic!("unexpected value: {other:?}"),
        }
    }

    #[test]
    fn parameters_test() {
        let mut config = DOMConfiguration::new();
        assert!(get_bool(&config, "namespaces"));
        assert!(get_bool(&config, "Comments"));
        assert!(!get_bool(&config, "validate"));
        assert!(get_bool(&config, "well-formed"));

        config.set_parameter("COMMENTS", false).unwrap();
        assert!(!config.comments());
        assert!(!get_bool(&config, "comments"));

        assert_eq!(
            config.set_parameter("unknown", true),
            Err(DOMException::NotFoundErr)
        );
        assert_eq!(
            config.set_parameter("validate", true),
            Err(DOMException::NotSupportedErr)
        );
        config.set_parameter("validate", false).unwrap();
        assert_eq!(
            config.set_parameter("namespaces", DOMConfigValue::ErrorHandler(None)),
            Err(DOMException::TypeMismatchErr)
        );
        assert_eq!(
            config.set_parameter("error-handler", true),
            Err(DOMException::TypeMismatchErr)
        );

        assert!(config.can_set_parameter("well-formed", &true.into()));
        assert!(!config.can_set_parameter("well-formed", &false.into()));
        assert!(!config.can_set_parameter("nothing", &true.into()));
        assert_eq!(config.parameter_names().len(), 9);
    }

    #[test]
    fn error_handler_parameter_test() {
        let mut config = DOMConfiguration::new();
        assert!(config.error_handler().is_none());
        let handler: Rc<dyn DOMErrorHandler> = Rc::new(|_: DOMError| true);
        config
            .set_parameter("error-handler", DOMConfigValue::ErrorHandler(Some(handler)))
            .unwrap();

        // clones share the table
        let shared = config.clone();
        assert!(shared.error_handler().is_some());
        let copy = config.deep_copy();
        config
            .set_parameter("error-handler", DOMConfigValue::ErrorHandler(None))
            .unwrap();
        assert!(shared.error_handler().is_none());
        assert!(copy.error_handler().is_some());
    }
}
