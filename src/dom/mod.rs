//! The document tree.
//!
//! Translation builds nodes bottom-up with *absolute* indentation, i.e. the
//! whole whitespace prefix measured from the document's left margin, always
//! starting with a `\n` marker. When a node's own indentation is fixed it
//! demotes each direct child to *relative* indentation, the increment over
//! the parent. By the time the root is built every node below it is
//! relative, and rendering composes text bottom-up while applying
//! indentation top-down.

mod indent;
mod select;
mod sequence;

use std::fmt;
use std::sync::Arc;

use crate::tag::{Body, Tag};
use crate::{Error, Result, Value};

pub use crate::dom::indent::{add_indent, del_indent, get_indent};
pub use crate::dom::select::Selector;
pub use crate::dom::sequence::{Content, Sequence};

/// A node of the document tree.
#[derive(Debug, Clone)]
pub enum Node {
    Root(Document),
    Element(Element),
    Text(Text),
}

/// The indentation of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Indent {
    /// Measured from the document margin, starts with `\n`.
    Absolute(String),
    /// Measured from the parent node.
    Relative(String),
}

/// The root of a document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    body: Sequence,
}

/// A structural node, optionally post-processed by a tag.
#[derive(Clone)]
pub struct Element {
    body: Sequence,
    tag: Option<Arc<dyn Tag>>,
    attrs: Vec<Value>,
    kwattrs: Vec<(String, Value)>,
    outline: bool,
    indent: Option<Indent>,
}

/// Construction parameters of an [`Element`].
#[derive(Clone, Default)]
pub struct ElementOptions {
    pub tag: Option<Arc<dyn Tag>>,
    pub attrs: Vec<Value>,
    pub kwattrs: Vec<(String, Value)>,
    pub outline: bool,
    /// `None` for inline elements that contribute no indentation.
    pub indent: Option<Indent>,
}

/// A leaf holding literal text.
///
/// The first line of the text is its headline; any further lines are the
/// tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    text: String,
}

impl Node {
    /// Renders the node and everything below it.
    pub fn render(&self) -> Result<String> {
        match self {
            Node::Root(doc) => doc.render(),
            Node::Element(element) => element.render(),
            Node::Text(text) => Ok(text.text.clone()),
        }
    }

    pub fn outline(&self) -> bool {
        match self {
            Node::Element(element) => element.outline,
            Node::Root(_) | Node::Text(_) => false,
        }
    }

    pub fn indent(&self) -> Option<&Indent> {
        match self {
            Node::Element(element) => element.indent.as_ref(),
            Node::Root(_) | Node::Text(_) => None,
        }
    }

    pub fn body(&self) -> Option<&Sequence> {
        match self {
            Node::Root(doc) => Some(&doc.body),
            Node::Element(element) => Some(&element.body),
            Node::Text(_) => None,
        }
    }

    /// Converts this node's absolute indentation into indentation relative
    /// to `parent`.
    ///
    /// Nodes without indentation of their own are transparent and pass the
    /// call on to their children. Nodes that are already relative are left
    /// alone.
    pub fn relative_indent(&mut self, parent: &str) -> Result<()> {
        match self {
            Node::Element(element) => element.relative_indent(parent),
            Node::Root(_) | Node::Text(_) => Ok(()),
        }
    }

    /// Re-anchors a relative node at the absolute position `base`, so that it
    /// can be placed under a different parent.
    pub(crate) fn rebase(&mut self, base: &str) {
        if let Node::Element(element) = self {
            match &element.indent {
                Some(Indent::Relative(rel)) => {
                    element.indent = Some(Indent::Absolute(format!("{base}{rel}")));
                }
                Some(Indent::Absolute(_)) => {}
                None => {
                    for child in element.body.iter_mut() {
                        child.rebase(base);
                    }
                }
            }
        }
    }

    /// Returns every descendant element that matches the selector, in
    /// document order.
    pub fn select(&self, selector: &Selector) -> Sequence {
        let mut found = Vec::new();
        if let Some(body) = self.body() {
            select::collect(body, selector, &mut found);
        }
        Sequence::from_nodes(found)
    }
}

impl Document {
    /// Builds the root of a document and demotes the body to relative
    /// indentation.
    pub fn new(body: Sequence) -> Result<Self> {
        let mut doc = Self { body };
        for child in doc.body.iter_mut() {
            child.relative_indent("\n")?;
        }
        Ok(doc)
    }

    pub fn body(&self) -> &Sequence {
        &self.body
    }

    /// Renders the document.
    ///
    /// One leading newline is stripped from the output. Translation starts
    /// every outline block with a newline, including the very first one.
    pub fn render(&self) -> Result<String> {
        let out = self.body.render()?;
        match out.strip_prefix('\n') {
            Some(rest) => Ok(rest.to_owned()),
            None => Ok(out),
        }
    }

    /// Returns every element in the document that matches the selector.
    pub fn select(&self, selector: &Selector) -> Sequence {
        let mut found = Vec::new();
        select::collect(&self.body, selector, &mut found);
        Sequence::from_nodes(found)
    }
}

impl Element {
    /// Builds an element.
    ///
    /// A void tag with a non-empty body is rejected. When `options.indent`
    /// is absolute the children are demoted to indentation relative to it.
    pub fn new(body: Sequence, options: ElementOptions) -> Result<Self> {
        let ElementOptions {
            tag,
            attrs,
            kwattrs,
            outline,
            indent,
        } = options;
        if let Some(tag) = &tag {
            if tag.is_void() && !body.is_empty() {
                return Err(Error::void_body(tag.name()));
            }
        }
        let mut element = Self {
            body,
            tag,
            attrs,
            kwattrs,
            outline,
            indent: None,
        };
        match indent {
            Some(Indent::Absolute(indent)) => element.set_indent(indent)?,
            indent => element.indent = indent,
        }
        Ok(element)
    }

    /// A transparent grouping element with no tag.
    pub fn group(body: Sequence, outline: bool, indent: Option<Indent>) -> Result<Self> {
        Self::new(
            body,
            ElementOptions {
                outline,
                indent,
                ..Default::default()
            },
        )
    }

    /// Assigns the absolute indentation of this element and demotes every
    /// direct child to indentation relative to it.
    pub fn set_indent(&mut self, indent: String) -> Result<()> {
        if !indent.starts_with('\n') {
            return Err(Error::malformed_indent(format!(
                "absolute indentation {indent:?} must start with a newline"
            )));
        }
        for child in self.body.iter_mut() {
            child.relative_indent(&indent)?;
        }
        self.indent = Some(Indent::Absolute(indent));
        Ok(())
    }

    fn relative_indent(&mut self, parent: &str) -> Result<()> {
        match &self.indent {
            None => {
                for child in self.body.iter_mut() {
                    child.relative_indent(parent)?;
                }
                Ok(())
            }
            Some(Indent::Absolute(indent)) => match indent.strip_prefix(parent) {
                Some(rel) => {
                    self.indent = Some(Indent::Relative(rel.to_owned()));
                    Ok(())
                }
                None => Err(Error::malformed_indent(format!(
                    "indentation {indent:?} does not extend the parent's {parent:?}"
                ))),
            },
            Some(Indent::Relative(_)) => Ok(()),
        }
    }

    pub fn body(&self) -> &Sequence {
        &self.body
    }

    pub fn tag(&self) -> Option<&Arc<dyn Tag>> {
        self.tag.as_ref()
    }

    pub fn attrs(&self) -> &[Value] {
        &self.attrs
    }

    pub fn kwattrs(&self) -> &[(String, Value)] {
        &self.kwattrs
    }

    /// Returns the named attribute, the last one if repeated.
    pub fn kwattr(&self, name: &str) -> Option<&Value> {
        self.kwattrs
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub fn outline(&self) -> bool {
        self.outline
    }

    pub fn indent(&self) -> Option<&Indent> {
        self.indent.as_ref()
    }

    pub fn render(&self) -> Result<String> {
        let text = match &self.tag {
            None => self.body.render()?,
            Some(tag) => {
                if tag.is_void() && !self.body.is_empty() {
                    return Err(Error::void_body(tag.name()));
                }
                tracing::trace!(tag = tag.name(), children = self.body.len(), "expanding tag");
                if tag.is_textual() {
                    let body = self.body.render()?;
                    tag.expand(Body::Text(&body), &self.attrs, &self.kwattrs)?
                } else {
                    tag.expand(Body::Nodes(&self.body), &self.attrs, &self.kwattrs)?
                }
            }
        };
        self.layout(text)
    }

    fn layout(&self, text: String) -> Result<String> {
        let text = if self.outline {
            format!("\n{text}")
        } else {
            text
        };
        match &self.indent {
            None => Ok(text),
            Some(Indent::Relative(indent)) => Ok(add_indent(&text, indent).into_owned()),
            Some(Indent::Absolute(indent)) => Err(Error::malformed_indent(format!(
                "element rendered with absolute indentation {indent:?}"
            ))),
        }
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("tag", &self.tag.as_ref().map(|t| t.name()))
            .field("attrs", &self.attrs)
            .field("kwattrs", &self.kwattrs)
            .field("outline", &self.outline)
            .field("indent", &self.indent)
            .field("body", &self.body)
            .finish()
    }
}

impl fmt::Debug for ElementOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementOptions")
            .field("tag", &self.tag.as_ref().map(|t| t.name()))
            .field("outline", &self.outline)
            .field("indent", &self.indent)
            .finish_non_exhaustive()
    }
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The first line of the text.
    pub fn headline(&self) -> &str {
        self.text.split('\n').next().unwrap_or_default()
    }

    /// Everything after the first line, without the separating newline.
    pub fn tail(&self) -> Option<&str> {
        self.text.split_once('\n').map(|(_, tail)| tail)
    }
}

impl From<Text> for Node {
    fn from(text: Text) -> Self {
        Node::Text(text)
    }
}

impl From<Element> for Node {
    fn from(element: Element) -> Self {
        Node::Element(element)
    }
}

impl From<Document> for Node {
    fn from(doc: Document) -> Self {
        Node::Root(doc)
    }
}
