use std::{cell::RefCell, rc::Rc};

use anyhow::{Context, Result, ensure};
use exdom::dom::{
    XML_NS_NAMESPACE,
    configuration::DOMConfigValue,
    document::DocumentRef,
    dom_error::{DOMError, DOMErrorHandler, DOMErrorSeverity, DOMErrorType},
    element::ElementRef,
    node::{Node, NodeRef},
};

fn declared_prefixes(element: &ElementRef) -> Vec<String> {
    let mut names = element
        .attributes()
        .map(|attrs| attrs.items())
        .unwrap_or_default()
        .into_iter()
        .map(|attr| attr.node_name().to_string())
        .filter(|name| name == "xmlns" || name.starts_with("xmlns:"))
        .collect::<Vec<_>>();
    names.sort();
    names
}

/// Each builder returns a document whose element tree needs some repair.
type Builder = fn() -> Result<DocumentRef>;

fn unbound_element_prefixes() -> Result<DocumentRef> {
    let doc = DocumentRef::new(Some("urn:x"), Some("x:root"), None)?;
    let mut root = doc.document_element().context("root")?;
    let mut child = doc.create_element_ns(Some("urn:y"), "y:child")?;
    child.append_child(doc.create_element_ns(Some("urn:x"), "x:leaf")?.into())?;
    child.append_child(doc.create_element_ns(Some("urn:x"), "other:leaf")?.into())?;
    root.append_child(child.into())?;
    Ok(doc)
}

fn changing_default_namespace() -> Result<DocumentRef> {
    let doc = DocumentRef::new(Some("urn:a"), Some("root"), None)?;
    let mut root = doc.document_element().context("root")?;
    let mut middle = doc.create_element_ns(Some("urn:b"), "middle")?;
    middle.append_child(doc.create_element_ns(Some("urn:a"), "inner")?.into())?;
    middle.append_child(doc.create_text_node("text").into())?;
    root.append_child(middle.into())?;
    Ok(doc)
}

fn attribute_namespaces() -> Result<DocumentRef> {
    let doc = DocumentRef::new(None, Some("root"), None)?;
    let mut root = doc.document_element().context("root")?;
    root.set_attribute("xmlns:p", "urn:p")?;
    let mut child = doc.create_element("child")?;
    child.set_attribute_ns(Some("urn:p"), "bare", "1")?;
    child.set_attribute_ns(Some("urn:q"), "p:clash", "2")?;
    child.set_attribute_ns(Some("urn:r"), "r:own", "3")?;
    child.set_attribute_ns(Some("urn:s"), "plain", "4")?;
    root.append_child(child.clone().into())?;
    let mut grandchild = doc.create_element("grandchild")?;
    grandchild.set_attribute_ns(Some("urn:s"), "again", "5")?;
    child.append_child(grandchild.into())?;
    Ok(doc)
}

#[test]
fn normalization_is_idempotent_test() -> Result<()> {
    let builders: [Builder; 3] = [
        unbound_element_prefixes,
        changing_default_namespace,
        attribute_namespaces,
    ];
    for build in builders {
        let doc = build()?;
        let mut root = doc.document_element().context("root")?;
        ensure!(root.normalize_namespaces().is_empty());

        let snapshot = root.clone_node(true);
        let index = doc.namespace_index();
        ensure!(root.normalize_namespaces().is_empty());

        ensure!(root.is_equal_node(&snapshot), "second pass changed the tree");
        ensure!(doc.namespace_index() == index);
    }
    Ok(())
}

#[test]
fn normalized_tree_resolves_namespaces_test() -> Result<()> {
    let doc = changing_default_namespace()?;
    let mut root = doc.document_element().context("root")?;
    ensure!(root.normalize_namespaces().is_empty());

    let middle = root
        .first_child()
        .and_then(|node| node.as_element())
        .context("middle")?;
    let inner = middle
        .first_child()
        .and_then(|node| node.as_element())
        .context("inner")?;
    assert_eq!(root.get_attribute("xmlns").as_deref(), Some("urn:a"));
    assert_eq!(middle.get_attribute("xmlns").as_deref(), Some("urn:b"));
    assert_eq!(inner.get_attribute("xmlns").as_deref(), Some("urn:a"));

    for element in [&root, &middle, &inner] {
        let namespace_uri = element.namespace_uri();
        assert_eq!(
            element.lookup_namespace_uri(element.prefix().as_deref()),
            namespace_uri
        );
    }
    Ok(())
}

#[test]
fn inherited_binding_adds_nothing_test() -> Result<()> {
    let doc = DocumentRef::new(Some("urn:x"), Some("root"), None)?;
    let mut root = doc.document_element().context("root")?;
    root.set_attribute("xmlns", "urn:x")?;
    let mut child = doc.create_element_ns(Some("urn:x"), "child")?;
    let leaf = doc.create_element_ns(Some("urn:x"), "leaf")?;
    child.append_child(leaf.clone().into())?;
    root.append_child(child.clone().into())?;

    ensure!(root.normalize_namespaces().is_empty());
    assert_eq!(declared_prefixes(&root), ["xmlns"]);
    assert!(declared_prefixes(&child).is_empty());
    assert!(declared_prefixes(&leaf).is_empty());
    assert_eq!(doc.namespace_index(), 1);
    Ok(())
}

#[test]
fn unprefixed_attribute_gets_synthetic_prefix_test() -> Result<()> {
    let doc = DocumentRef::new(None, Some("root"), None)?;
    let mut root = doc.document_element().context("root")?;
    let mut element = doc.create_element("element")?;
    element.set_attribute_ns(Some("urn:y"), "attr", "value")?;
    root.append_child(element.clone().into())?;

    ensure!(root.normalize_namespaces().is_empty());
    assert_eq!(declared_prefixes(&element), ["xmlns:NS1"]);
    assert_eq!(element.get_attribute("xmlns:NS1").as_deref(), Some("urn:y"));
    let attr = element
        .get_attribute_node_ns(Some("urn:y"), "attr")
        .context("attr")?;
    assert_eq!(attr.prefix().as_deref(), Some("NS1"));
    assert_eq!(attr.node_name().as_ref(), "NS1:attr");
    assert_eq!(attr.value(), "value");
    assert!(declared_prefixes(&root).is_empty());
    assert_eq!(doc.namespace_index(), 2);
    Ok(())
}

#[test]
fn xmlns_rebinding_is_rejected_test() -> Result<()> {
    let doc = DocumentRef::new(None, Some("root"), None)?;
    let mut root = doc.document_element().context("root")?;
    root.set_attribute("xmlns", XML_NS_NAMESPACE)?;
    let child = doc.create_element("child")?;
    root.append_child(child.clone().into())?;

    let errors = root.normalize_namespaces();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error_type(), DOMErrorType::NamespaceReassignment);
    assert_eq!(errors[0].severity(), DOMErrorSeverity::SeverityError);
    assert!(root.namespace_bindings().get(None).is_none());
    assert!(child.namespace_uri().is_none());
    assert!(declared_prefixes(&child).is_empty());
    // the offending attribute itself is left alone
    assert_eq!(root.get_attribute("xmlns").as_deref(), Some(XML_NS_NAMESPACE));
    Ok(())
}

#[test]
fn missing_local_name_is_reported_test() -> Result<()> {
    let doc = DocumentRef::new(None, Some("root"), None)?;
    let mut root = doc.document_element().context("root")?;
    let broken = doc.create_element("broken:")?;
    root.append_child(broken.clone().into())?;

    let errors = root.normalize_namespaces();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].error_type(), DOMErrorType::MissingLocalName);
    assert_eq!(errors[0].related_node(), Some(&NodeRef::from(broken)));
    assert!(!errors[0].message().is_empty());
    Ok(())
}

#[test]
fn normalize_document_uses_configured_handler_test() -> Result<()> {
    let mut doc = DocumentRef::new(None, Some("root"), None)?;
    let mut root = doc.document_element().context("root")?;
    root.append_child(doc.create_element("first:")?.into())?;
    root.append_child(doc.create_element("second:")?.into())?;
    let mut late = doc.create_element("late")?;
    late.set_attribute_ns(Some("urn:l"), "a", "1")?;
    root.append_child(late.clone().into())?;

    let errors = Rc::new(RefCell::new(vec![]));
    let sink = errors.clone();
    let handler: Rc<dyn DOMErrorHandler> = Rc::new(move |error: DOMError| {
        sink.borrow_mut().push(error.error_type());
        true
    });
    doc.dom_config()
        .set_parameter("error-handler", DOMConfigValue::ErrorHandler(Some(handler)))?;

    doc.normalize_document();
    assert_eq!(
        *errors.borrow(),
        [DOMErrorType::MissingLocalName, DOMErrorType::MissingLocalName]
    );
    assert_eq!(late.get_attribute("xmlns:NS1").as_deref(), Some("urn:l"));
    Ok(())
}

#[test]
fn normalize_document_without_namespaces_test() -> Result<()> {
    let mut doc = DocumentRef::new(None, Some("root"), None)?;
    let mut root = doc.document_element().context("root")?;
    root.set_attribute_ns(Some("urn:y"), "attr", "value")?;
    doc.dom_config().set_parameter("namespaces", false)?;

    doc.normalize_document();
    assert!(declared_prefixes(&root).is_empty());
    assert_eq!(doc.namespace_index(), 1);
    Ok(())
}
