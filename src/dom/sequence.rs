use std::slice;
use std::vec;

use crate::dom::Node;
use crate::{Error, Result, Value};

/// An ordered, flat list of nodes.
#[derive(Debug, Clone, Default)]
pub struct Sequence {
    nodes: Vec<Node>,
}

/// Anything that can be flattened into a [`Sequence`].
#[derive(Debug, Clone)]
pub enum Content {
    /// Dropped.
    None,
    Node(Node),
    Sequence(Sequence),
    List(Vec<Content>),
    /// Accepted when it holds nodes, a list of acceptable values, or none.
    Value(Value),
}

impl Sequence {
    /// Builds a sequence by recursively flattening `items`.
    ///
    /// Nested lists and sequences are spliced in place and `None` entries
    /// are dropped. Any other value fails with a structural type error.
    pub fn new<I, C>(items: I) -> Result<Self>
    where
        I: IntoIterator<Item = C>,
        C: Into<Content>,
    {
        let mut nodes = Vec::new();
        for item in items {
            flatten(item.into(), &mut nodes)?;
        }
        Ok(Self { nodes })
    }

    /// Wraps nodes that are already a flat list.
    pub fn from_nodes(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<'_, Node> {
        self.nodes.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub(crate) fn iter_mut(&mut self) -> slice::IterMut<'_, Node> {
        self.nodes.iter_mut()
    }

    pub(crate) fn into_nodes(self) -> Vec<Node> {
        self.nodes
    }

    /// Renders every node and concatenates the results.
    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        for node in &self.nodes {
            out.push_str(&node.render()?);
        }
        Ok(out)
    }
}

fn flatten(content: Content, nodes: &mut Vec<Node>) -> Result<()> {
    match content {
        Content::None => {}
        Content::Node(node) => nodes.push(node),
        Content::Sequence(seq) => nodes.extend(seq.nodes),
        Content::List(items) => {
            for item in items {
                flatten(item, nodes)?;
            }
        }
        Content::Value(value) => match value {
            Value::None => {}
            Value::Nodes(seq) => nodes.extend(seq.nodes),
            Value::List(items) => {
                for item in items {
                    flatten(Content::Value(item), nodes)?;
                }
            }
            value => {
                return Err(Error::structural(format!(
                    "expected a node, found {}",
                    value.human()
                )));
            }
        },
    }
    Ok(())
}

impl IntoIterator for Sequence {
    type Item = Node;
    type IntoIter = vec::IntoIter<Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.into_iter()
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a Node;
    type IntoIter = slice::Iter<'a, Node>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}

impl From<Node> for Content {
    fn from(node: Node) -> Self {
        Self::Node(node)
    }
}

impl From<Option<Node>> for Content {
    fn from(node: Option<Node>) -> Self {
        node.map_or(Self::None, Self::Node)
    }
}

impl From<Sequence> for Content {
    fn from(seq: Sequence) -> Self {
        Self::Sequence(seq)
    }
}

impl<C> From<Vec<C>> for Content
where
    C: Into<Content>,
{
    fn from(items: Vec<C>) -> Self {
        Self::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Value> for Content {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}
