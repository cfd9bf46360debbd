//! The tag contract through which a structural node produces its text.
//!
//! A [`Tag`] receives the body of an element, either already rendered or as
//! the node sequence itself, together with the element's positional and
//! named attributes, and returns the element's text. Tags never add the
//! leading newline of outline elements nor any indentation; the renderer
//! does both, so a tag behaves the same wherever it is used.

mod markup;

use std::fmt;
use std::sync::Arc;

use crate::dom::Sequence;
use crate::scope::Closure;
use crate::{Result, Value};

pub use crate::tag::markup::{quote_attr, MarkupTag, Mode, Registry, HTML, XHTML};

/// A tag that can be attached to an element.
///
/// # Examples
///
/// ```
/// use hypertag::{Body, Result, Tag, Value};
///
/// #[derive(Debug)]
/// struct Upper;
///
/// impl Tag for Upper {
///     fn name(&self) -> &str {
///         "upper"
///     }
///
///     fn expand(&self, body: Body<'_>, _: &[Value], _: &[(String, Value)]) -> Result<String> {
///         Ok(body.render()?.to_uppercase())
///     }
/// }
/// ```
pub trait Tag: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// The tag takes no body. Checked by the renderer.
    fn is_void(&self) -> bool {
        false
    }

    /// The tag takes its body as rendered text rather than as nodes.
    fn is_textual(&self) -> bool {
        true
    }

    /// The expansion depends only on its arguments, so its result may be
    /// cached.
    fn is_pure(&self) -> bool {
        true
    }

    fn expand(&self, body: Body<'_>, attrs: &[Value], kwattrs: &[(String, Value)])
        -> Result<String>;
}

/// The body handed to [`Tag::expand`].
#[derive(Debug, Clone, Copy)]
pub enum Body<'a> {
    /// The rendered body, for textual tags.
    Text(&'a str),
    /// The body nodes, for other tags.
    Nodes(&'a Sequence),
}

impl Body<'_> {
    pub fn is_empty(&self) -> bool {
        match self {
            Body::Text(text) => text.is_empty(),
            Body::Nodes(seq) => seq.is_empty(),
        }
    }

    /// Returns the body as text, rendering the nodes if needed.
    pub fn render(&self) -> Result<String> {
        match self {
            Body::Text(text) => Ok((*text).to_owned()),
            Body::Nodes(seq) => seq.render(),
        }
    }
}

/// A hypertag that can be called from a script.
#[derive(Debug, Clone)]
pub enum Hypertag {
    /// A tag implemented in Rust, expanded at render time.
    External(Arc<dyn Tag>),
    /// A hypertag defined in the script, expanded during translation.
    Native(Closure),
}

impl Hypertag {
    pub fn name(&self) -> &str {
        match self {
            Hypertag::External(tag) => tag.name(),
            Hypertag::Native(closure) => closure.name(),
        }
    }

    pub(crate) fn same(&self, other: &Self) -> bool {
        match (self, other) {
            (Hypertag::External(a), Hypertag::External(b)) => Arc::ptr_eq(a, b),
            (Hypertag::Native(a), Hypertag::Native(b)) => a.same(b),
            _ => false,
        }
    }
}

impl<T> From<Arc<T>> for Hypertag
where
    T: Tag + 'static,
{
    fn from(tag: Arc<T>) -> Self {
        Hypertag::External(tag)
    }
}
