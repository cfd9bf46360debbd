use crate::dom::{Node, Sequence};
use crate::Value;

/// Criteria for locating elements in a document.
///
/// Criteria that are not set match anything.
///
/// # Examples
///
/// ```
/// use hypertag::Selector;
///
/// let selector = Selector::new().tag("li").class("active");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    class: Option<String>,
    attrs: Vec<(String, Value)>,
}

impl Selector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Matches elements whose tag has exactly this name.
    pub fn tag(mut self, name: impl Into<String>) -> Self {
        self.tag = Some(name.into());
        self
    }

    /// Matches elements whose `id` attribute equals this string.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Matches elements whose `class` attribute contains this token.
    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Matches elements whose named attribute equals this value.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    pub fn matches(&self, node: &Node) -> bool {
        let element = match node {
            Node::Element(element) => element,
            Node::Root(_) | Node::Text(_) => return false,
        };
        if let Some(name) = &self.tag {
            match element.tag() {
                Some(tag) if tag.name() == name => {}
                _ => return false,
            }
        }
        if let Some(id) = &self.id {
            if element.kwattr("id").and_then(Value::as_str) != Some(id.as_str()) {
                return false;
            }
        }
        if let Some(class) = &self.class {
            let found = match element.kwattr("class") {
                Some(Value::String(classes)) => classes.split_whitespace().any(|c| c == class),
                Some(Value::List(classes)) => classes.iter().any(|c| c.as_str() == Some(class)),
                _ => false,
            };
            if !found {
                return false;
            }
        }
        self.attrs
            .iter()
            .all(|(name, value)| element.kwattr(name) == Some(value))
    }
}

pub(crate) fn collect(body: &Sequence, selector: &Selector, found: &mut Vec<Node>) {
    for node in body {
        if selector.matches(node) {
            found.push(node.clone());
        }
        if let Some(body) = node.body() {
            collect(body, selector, found);
        }
    }
}
