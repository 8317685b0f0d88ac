use super::{
    DOMException, NodeType,
    node::{Node, NodeData, NodeRef, impl_node_handle},
};

/// Byte position of the `offset`-th character of `data`.\
/// The end of the string is a valid position.
fn byte_offset(data: &str, offset: usize) -> Result<usize, DOMException> {
    data.char_indices()
        .map(|(pos, _)| pos)
        .chain(Some(data.len()))
        .nth(offset)
        .ok_or(DOMException::IndexSizeErr)
}

/// Byte range of `count` characters from the `offset`-th character.
/// `count` is clamped to the end of the string.
fn byte_range(data: &str, offset: usize, count: usize) -> Result<(usize, usize), DOMException> {
    let start = byte_offset(data, offset)?;
    let end = data[start..]
        .char_indices()
        .nth(count)
        .map_or(data.len(), |(pos, _)| start + pos);
    Ok((start, end))
}

/// Implementation of [CharacterData](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-FF21A306)
/// interface on [1.4 Fundamental Interfaces: Core Module](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-BBACDC08)
///
/// Strings are encoded in UTF-8, not UTF-16.\
/// Offsets, counts and lengths are measured in `char`s.
pub trait CharacterData: Node {
    /// Implementation of [`data`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-72AB8359) attribute.
    fn data(&self) -> String {
        self.as_node_ref().character_data().unwrap_or_default()
    }

    fn set_data(&mut self, data: impl Into<String>) {
        let data = data.into();
        self.as_node_ref()
            .with_character_data_mut(|current| *current = data);
    }

    /// Implementation of [`length`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-7D61178C) attribute.
    ///
    /// # Note
    /// Unlike the specification, this implementation returns **the number of `char`s**,
    /// not the number of 16-bit units.
    fn length(&self) -> usize {
        self.data().chars().count()
    }

    /// Implementation of [`substringData`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-6531BCCF).
    ///
    /// # Specification
    /// ```text
    /// Return Value
    ///     DOMString The specified substring. If the sum of offset and count exceeds the
    ///               length, then all 16-bit units to the end of the data are returned.
    ///
    /// Exceptions
    ///     DOMException
    ///     INDEX_SIZE_ERR:     Raised if the specified offset is negative or greater than
    ///                         the number of 16-bit units in data, or if the specified
    ///                         count is negative.
    /// ```
    fn substring_data(&self, offset: usize, count: usize) -> Result<String, DOMException> {
        let data = self.data();
        let (start, end) = byte_range(&data, offset, count)?;
        Ok(data[start..end].to_owned())
    }

    /// Implementation of [`appendData`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-32791A2F) method.
    fn append_data(&mut self, arg: &str) {
        self.as_node_ref()
            .with_character_data_mut(|data| data.push_str(arg));
    }

    /// Implementation of [`insertData`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-3EDB695F) method.
    fn insert_data(&mut self, offset: usize, arg: &str) -> Result<(), DOMException> {
        let mut data = self.data();
        let pos = byte_offset(&data, offset)?;
        data.insert_str(pos, arg);
        self.set_data(data);
        Ok(())
    }

    /// Implementation of [`deleteData`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-7C603781) method.
    ///
    /// If `offset + count` exceeds the length, all characters from `offset` to the end
    /// are deleted.
    fn delete_data(&mut self, offset: usize, count: usize) -> Result<(), DOMException> {
        self.replace_data(offset, count, "")
    }

    /// Implementation of [`replaceData`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-E5CBA7FB) method.
    fn replace_data(&mut self, offset: usize, count: usize, arg: &str) -> Result<(), DOMException> {
        let mut data = self.data();
        let (start, end) = byte_range(&data, offset, count)?;
        data.replace_range(start..end, arg);
        self.set_data(data);
        Ok(())
    }
}

impl_node_handle!(
    /// Implementation of [Text](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1312295772)
    /// interface on [1.4 Fundamental Interfaces: Core Module](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-BBACDC08)
    TextRef,
    Text,
    as_text_node
);

impl_node_handle!(
    /// Implementation of [CDATASection](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-667469212)
    /// interface on [1.5 Extended Interfaces: XML Module](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-E067D597)
    CDATASectionRef,
    CDATASection,
    as_cdata_section
);

impl_node_handle!(
    /// Implementation of [Comment](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-1728279322)
    /// interface on [1.4 Fundamental Interfaces: Core Module](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-BBACDC08)
    CommentRef,
    Comment,
    as_comment
);

impl CharacterData for TextRef {}
impl CharacterData for CDATASectionRef {}
impl CharacterData for CommentRef {}

/// Move the data after `offset` into a new node of the same kind, linked right
/// after `node` if it has a parent.
fn split_node(node: &NodeRef, offset: usize) -> Result<NodeRef, DOMException> {
    let data = node.character_data().unwrap_or_default();
    let pos = byte_offset(&data, offset)?;
    let tail = data[pos..].to_owned();
    node.with_character_data_mut(|data| data.truncate(pos));

    let document = node.document_node();
    let new = NodeRef::create(document.as_ref(), node.node_name(), None, |_| {
        match node.node_type() {
            NodeType::CDATASection => NodeData::CDATASection(tail),
            _ => NodeData::Text(tail),
        }
    });
    if let Some(mut parent) = node.parent_node() {
        parent.insert_before(new.clone(), node.next_sibling())?;
    }
    Ok(new)
}

/// The data of `node` and of the Text and CDATASection nodes logically adjacent to it,
/// in document order.
fn whole_text(node: &NodeRef) -> String {
    let is_text = |node: &NodeRef| {
        matches!(node.node_type(), NodeType::Text | NodeType::CDATASection)
    };
    let mut first = node.clone();
    while let Some(prev) = first.previous_sibling().filter(is_text) {
        first = prev;
    }
    let mut buf = String::new();
    let mut current = Some(first);
    while let Some(text) = current.filter(is_text) {
        buf.push_str(&text.character_data().unwrap_or_default());
        current = text.next_sibling();
    }
    buf
}

impl TextRef {
    pub(super) fn create(owner_document: Option<&NodeRef>, data: impl Into<String>) -> Self {
        let data = data.into();
        TextRef(NodeRef::create(owner_document, "#text".into(), None, |_| {
            NodeData::Text(data)
        }))
    }

    /// Implementation of [`splitText`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#core-ID-38853C1D) method.
    ///
    /// # Specification
    /// ```text
    /// Breaks this node into two nodes at the specified offset, keeping both in the
    /// tree as siblings. After being split, this node will contain all the content up
    /// to the offset point. A new node of the same type, which contains all the content
    /// at and after the offset point, is returned. If the original node had a parent
    /// node, the new node is inserted as the next sibling of the original node. When
    /// the offset is equal to the length of this node, the new node has no data.
    /// ```
    pub fn split_text(&mut self, offset: usize) -> Result<TextRef, DOMException> {
        split_node(&self.0, offset).map(TextRef)
    }

    /// Implementation of [`wholeText`](https://www.w3.org/TR/2004/REC-DOM-Level-3-Core-20040407/DOM3-Core.html#Text3-wholeText) attribute.
    pub fn whole_text(&self) -> String {
        whole_text(&self.0)
    }
}

impl CDATASectionRef {
    pub(super) fn create(owner_document: Option<&NodeRef>, data: impl Into<String>) -> Self {
        let data = data.into();
        CDATASectionRef(NodeRef::create(
            owner_document,
            "#cdata-section".into(),
            None,
            |_| NodeData::CDATASection(data),
        ))
    }

    /// Same as [`TextRef::split_text`].
    pub fn split_text(&mut self, offset: usize) -> Result<CDATASectionRef, DOMException> {
        split_node(&self.0, offset).map(CDATASectionRef)
    }

    pub fn whole_text(&self) -> String {
        whole_text(&self.0)
    }
}

impl CommentRef {
    pub(super) fn create(owner_document: Option<&NodeRef>, data: impl Into<String>) -> Self {
        let data = data.into();
        CommentRef(NodeRef::create(
            owner_document,
            "#comment".into(),
            None,
            |_| NodeData::Comment(data),
        ))
    }
}
