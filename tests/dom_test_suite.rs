use std::{cell::RefCell, rc::Rc};

use anyhow::{Context, Result, ensure};
use exdom::dom::{
    DOMException, NodeType,
    character_data::CharacterData,
    configuration::DOMConfigValue,
    document::DocumentRef,
    dom_implementation::DOMImplementation,
    element::ElementRef,
    node::{Node, NodeRef},
    user_data::{DOMUserData, OperationType, UserDataHandler},
};

fn document() -> Result<(DocumentRef, ElementRef)> {
    let doc = DocumentRef::new(None, Some("root"), None)?;
    let root = doc.document_element().context("document element")?;
    Ok((doc, root))
}

fn element_children(
    doc: &DocumentRef,
    parent: &mut ElementRef,
    names: &[&str],
) -> Result<Vec<NodeRef>> {
    let mut children = vec![];
    for name in names {
        let child: NodeRef = doc.create_element(name)?.into();
        parent.append_child(child.clone())?;
        children.push(child);
    }
    Ok(children)
}

fn names(node: &impl Node) -> Vec<String> {
    node.child_nodes()
        .iter()
        .map(|child| child.node_name().to_string())
        .collect()
}

/// Check the links of every child of `parent`.
fn check_links(parent: &impl Node) -> Result<()> {
    let children = parent.child_nodes();
    ensure!(parent.first_child() == children.first().cloned());
    ensure!(parent.last_child() == children.last().cloned());
    for (i, child) in children.iter().enumerate() {
        ensure!(child.parent_node().is_some_and(|p| p.is_same_node(parent)));
        let prev = i.checked_sub(1).map(|i| children[i].clone());
        ensure!(child.previous_sibling() == prev);
        ensure!(child.next_sibling() == children.get(i + 1).cloned());
    }
    Ok(())
}

#[test]
fn insert_before_takes_reference_position_test() -> Result<()> {
    for position in 0..3 {
        let (doc, mut root) = document()?;
        let children = element_children(&doc, &mut root, &["a", "b", "c"])?;
        let reference = children[position].clone();
        let former_prev = reference.previous_sibling();

        let new_child: NodeRef = doc.create_element("n")?.into();
        root.insert_before(new_child.clone(), Some(reference.clone()))?;

        ensure!(new_child.parent_node() == Some(NodeRef::from(root.clone())));
        ensure!(new_child.previous_sibling() == former_prev);
        ensure!(new_child.next_sibling() == Some(reference.clone()));
        ensure!(reference.previous_sibling() == Some(new_child.clone()));
        check_links(&root)?;
    }
    Ok(())
}

#[test]
fn insert_moves_attached_node_test() -> Result<()> {
    let (doc, mut root) = document()?;
    let children = element_children(&doc, &mut root, &["a", "b", "c", "d"])?;
    root.insert_before(children[3].clone(), Some(children[1].clone()))?;
    assert_eq!(names(&root), ["a", "d", "b", "c"]);
    check_links(&root)?;

    let mut other = doc.create_element("other")?;
    other.append_child(children[0].clone())?;
    assert_eq!(names(&root), ["d", "b", "c"]);
    assert_eq!(children[0].parent_node(), Some(NodeRef::from(other.clone())));
    check_links(&root)?;
    check_links(&other)?;
    Ok(())
}

#[test]
fn remove_then_append_restores_presence_test() -> Result<()> {
    let (doc, mut root) = document()?;
    let children = element_children(&doc, &mut root, &["a", "b", "c"])?;
    let removed = root.remove_child(children[1].clone())?;
    assert!(removed.parent_node().is_none());
    assert!(removed.previous_sibling().is_none());
    assert!(removed.next_sibling().is_none());
    assert_eq!(names(&root), ["a", "c"]);

    root.append_child(removed)?;
    assert_eq!(names(&root), ["a", "c", "b"]);
    check_links(&root)?;
    Ok(())
}

#[test]
fn remove_sole_child_clears_endpoints_test() -> Result<()> {
    let (doc, mut root) = document()?;
    let only: NodeRef = doc.create_text_node("only").into();
    root.append_child(only.clone())?;
    root.remove_child(only)?;
    assert!(root.first_child().is_none());
    assert!(root.last_child().is_none());
    assert!(!root.has_child_nodes());
    Ok(())
}

#[test]
fn failed_mutation_leaves_tree_unchanged_test() -> Result<()> {
    let (doc, mut root) = document()?;
    let children = element_children(&doc, &mut root, &["a", "b"])?;
    let mut a = children[0].clone();
    let stranger: NodeRef = doc.create_element("stranger")?.into();

    assert_eq!(
        a.append_child(root.clone().into()),
        Err(DOMException::HierarchyRequestErr)
    );
    assert_eq!(
        root.insert_before(doc.create_text_node("t").into(), Some(stranger.clone())),
        Err(DOMException::NotFoundErr)
    );
    assert_eq!(
        root.replace_child(doc.create_text_node("t").into(), stranger.clone()),
        Err(DOMException::NotFoundErr)
    );
    assert_eq!(
        root.remove_child(stranger),
        Err(DOMException::NotFoundErr)
    );
    let mut doc_node = doc.clone();
    assert_eq!(
        doc_node.append_child(doc.create_element("second")?.into()),
        Err(DOMException::HierarchyRequestErr)
    );

    assert_eq!(names(&root), ["a", "b"]);
    check_links(&root)?;
    Ok(())
}

#[test]
fn replace_child_test() -> Result<()> {
    let (doc, mut root) = document()?;
    let children = element_children(&doc, &mut root, &["a", "b", "c"])?;
    let mut fragment = doc.create_document_fragment();
    fragment.append_child(doc.create_element("x")?.into())?;
    fragment.append_child(doc.create_element("y")?.into())?;

    let replaced = root.replace_child(fragment.clone().into(), children[1].clone())?;
    assert!(replaced.is_same_node(&children[1]));
    assert!(replaced.parent_node().is_none());
    assert!(!fragment.has_child_nodes());
    assert_eq!(names(&root), ["a", "x", "y", "c"]);
    check_links(&root)?;
    Ok(())
}

#[test]
fn normalize_merges_text_test() -> Result<()> {
    let (doc, mut root) = document()?;
    for value in ["a", "", "b", "c"] {
        root.append_child(doc.create_text_node(value).into())?;
    }
    root.normalize();

    let children = root.child_nodes();
    assert_eq!(children.len(), 1);
    let text = children[0].as_text_node().context("text")?;
    assert_eq!(text.data(), "abc");
    Ok(())
}

#[test]
fn shallow_clone_has_no_children_test() -> Result<()> {
    let (doc, mut root) = document()?;
    element_children(&doc, &mut root, &["a", "b"])?;
    root.set_attribute("k", "v")?;

    let shallow = root.clone_node(false);
    assert!(!shallow.has_child_nodes());
    assert!(shallow.first_child().is_none());
    assert!(shallow.last_child().is_none());
    assert!(shallow.parent_node().is_none());
    let shallow = shallow.as_element().context("element")?;
    assert_eq!(shallow.get_attribute("k").as_deref(), Some("v"));
    // the source keeps its children
    assert_eq!(names(&root), ["a", "b"]);

    let deep = root.clone_node(true);
    assert!(deep.is_equal_node(&root));
    assert!(!deep.is_same_node(&root));
    Ok(())
}

#[test]
fn text_lookup_matches_ancestor_test() -> Result<()> {
    let doc = DocumentRef::new(Some("urn:x"), Some("x:root"), None)?;
    let mut root = doc.document_element().context("document element")?;
    root.set_attribute("xmlns", "urn:default")?;
    let mut child = doc.create_element("child")?;
    root.append_child(child.clone().into())?;
    let text: NodeRef = doc.create_text_node("text").into();
    child.append_child(text.clone())?;

    for prefix in [Some(""), None, Some("x"), Some("unknown")] {
        assert_eq!(
            text.lookup_namespace_uri(prefix),
            child.lookup_namespace_uri(prefix)
        );
    }
    assert_eq!(
        text.lookup_namespace_uri(Some("")).as_deref(),
        Some("urn:default")
    );
    assert_eq!(text.lookup_prefix("urn:x").as_deref(), Some("x"));
    // `child` has no namespace URI, so the declaration on `root` governs
    assert!(text.is_default_namespace(Some("urn:default")));
    assert!(!text.is_default_namespace(None));

    // a detached Text has no ancestor element
    let detached = doc.create_text_node("detached");
    assert!(detached.lookup_namespace_uri(None).is_none());
    Ok(())
}

#[test]
fn document_api_test() -> Result<()> {
    let doctype = DOMImplementation.create_document_type("root", None, Some("root.dtd"))?;
    let doc = DOMImplementation.create_document(None, Some("root"), Some(doctype.clone()))?;
    assert_eq!(doc.doctype(), Some(doctype));
    assert_eq!(doc.child_nodes().len(), 2);
    assert_eq!(doc.node_type(), NodeType::Document);
    assert!(doc.is_supported("XML", Some("2.0")));

    let mut root = doc.document_element().context("document element")?;
    let mut item = doc.create_element_ns(Some("urn:i"), "i:item")?;
    item.set_attribute("id", "first")?;
    item.set_id_attribute("id", true)?;
    root.append_child(item.clone().into())?;
    let pi = doc.create_processing_instruction("target", Some("data"))?;
    root.append_child(pi.into())?;

    assert_eq!(doc.get_element_by_id("first"), Some(item.clone()));
    assert_eq!(doc.get_elements_by_tag_name("i:item"), [item.clone()]);
    assert_eq!(doc.get_elements_by_tag_name_ns(Some("urn:i"), "*"), [item.clone()]);
    assert_eq!(doc.get_elements_by_tag_name("*").len(), 2);
    assert_eq!(root.text_content().as_deref(), Some(""));
    Ok(())
}

#[test]
fn insertion_adopts_foreign_nodes_test() -> Result<()> {
    let (doc, mut root) = document()?;
    let other = DocumentRef::new(None, Some("root"), None)?;
    let mut foreign = other.create_element("foreign")?;
    foreign.set_attribute("a", "1")?;
    let text: NodeRef = other.create_text_node("t").into();
    foreign.append_child(text.clone())?;

    let adopted: Rc<RefCell<Vec<OperationType>>> = Rc::default();
    let log = adopted.clone();
    let handler: Rc<dyn UserDataHandler> = Rc::new(
        move |op: OperationType, _: &str, _: DOMUserData, _: Option<NodeRef>, _: Option<NodeRef>| {
            log.borrow_mut().push(op)
        },
    );
    foreign.set_user_data("key", Some(Rc::new("value") as DOMUserData), Some(handler));

    root.append_child(foreign.clone().into())?;
    assert_eq!(foreign.owner_document(), Some(doc.clone()));
    assert_eq!(text.owner_document(), Some(doc.clone()));
    let attr = foreign.get_attribute_node("a").context("attribute")?;
    assert_eq!(attr.owner_document(), Some(doc.clone()));
    assert_eq!(&*adopted.borrow(), &[OperationType::NodeAdopted]);
    Ok(())
}

#[test]
fn clone_user_data_test() -> Result<()> {
    let (_doc, mut root) = document()?;
    let events: Rc<RefCell<Vec<(OperationType, String)>>> = Rc::default();
    let log = events.clone();
    let handler: Rc<dyn UserDataHandler> = Rc::new(
        move |op: OperationType, key: &str, _: DOMUserData, src: Option<NodeRef>, dst: Option<NodeRef>| {
            assert!(src.is_some() && dst.is_some());
            log.borrow_mut().push((op, key.to_owned()))
        },
    );
    assert!(root
        .set_user_data("key", Some(Rc::new(42i32) as DOMUserData), Some(handler))
        .is_none());

    let copy = root.clone_node(false);
    assert_eq!(&*events.borrow(), &[(OperationType::NodeCloned, "key".to_owned())]);
    let data = copy.get_user_data("key").context("user data")?;
    assert_eq!(data.downcast_ref::<i32>(), Some(&42));

    let previous = root.set_user_data("key", None, None).context("previous")?;
    assert_eq!(previous.downcast_ref::<i32>(), Some(&42));
    assert!(root.get_user_data("key").is_none());
    Ok(())
}

#[test]
fn dom_config_test() -> Result<()> {
    let (doc, _root) = document()?;
    let mut config = doc.dom_config();
    assert!(matches!(
        config.get_parameter("namespaces")?,
        DOMConfigValue::Bool(true)
    ));
    config.set_parameter("comments", false)?;
    // the handle is shared with the document
    assert!(matches!(
        doc.dom_config().get_parameter("comments")?,
        DOMConfigValue::Bool(false)
    ));
    assert_eq!(
        config.set_parameter("canonical-form", true),
        Err(DOMException::NotSupportedErr)
    );
    Ok(())
}
