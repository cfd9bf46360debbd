//! Built-in markup tags, one per HTML element name.

use std::collections::HashMap;
use std::fmt::Write;
use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::tag::{Body, Tag};
use crate::{Error, Result, Value};

/// The registry of HTML tags, built once on first use.
pub static HTML: Lazy<Registry> = Lazy::new(|| Registry::markup(Mode::Html));

/// The registry of XHTML tags, built once on first use.
pub static XHTML: Lazy<Registry> = Lazy::new(|| Registry::markup(Mode::Xhtml));

const ELEMENTS: &[&str] = &[
    "a", "abbr", "address", "article", "aside", "audio", "b", "bdi", "bdo", "blockquote", "body",
    "button", "canvas", "caption", "cite", "code", "colgroup", "data", "datalist", "dd", "del",
    "details", "dfn", "dialog", "div", "dl", "dt", "em", "fieldset", "figcaption", "figure",
    "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hgroup", "html",
    "i", "iframe", "ins", "kbd", "label", "legend", "li", "main", "map", "mark", "menu", "meter",
    "nav", "noscript", "object", "ol", "optgroup", "option", "output", "p", "picture", "pre",
    "progress", "q", "rp", "rt", "ruby", "s", "samp", "script", "search", "section", "select",
    "slot", "small", "span", "strong", "style", "sub", "summary", "sup", "svg", "table", "tbody",
    "td", "template", "textarea", "tfoot", "th", "thead", "time", "title", "tr", "u", "ul",
    "var", "video",
];

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// The boolean attribute convention of a markup dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `checked=true` renders as `checked`, void tags as `<br>`.
    Html,
    /// `checked=true` renders as `checked="checked"`, void tags as `<br />`.
    Xhtml,
}

/// A tag that wraps its body in an opening and a closing markup tag.
#[derive(Debug, Clone)]
pub struct MarkupTag {
    name: String,
    void: bool,
    mode: Mode,
}

/// An immutable table of tags keyed by name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    tags: HashMap<String, Arc<dyn Tag>>,
}

impl MarkupTag {
    pub fn new(name: impl Into<String>, void: bool, mode: Mode) -> Self {
        Self {
            name: name.into(),
            void,
            mode,
        }
    }

    fn write_attrs(
        &self,
        out: &mut String,
        attrs: &[Value],
        kwattrs: &[(String, Value)],
    ) -> Result<()> {
        for value in attrs {
            match value {
                Value::None | Value::Bool(false) => {}
                // A bare `true` has no attribute name to render.
                Value::Bool(true) => {
                    return Err(Error::type_error(format!(
                        "positional attribute of `{}` must not be `true`",
                        self.name
                    )));
                }
                value => {
                    out.push(' ');
                    out.push_str(&attr_text(value)?);
                }
            }
        }
        for (name, value) in kwattrs {
            match value {
                Value::None | Value::Bool(false) => {}
                Value::Bool(true) => match self.mode {
                    Mode::Html => write!(out, " {name}").map_err(fmt_err)?,
                    Mode::Xhtml => write!(out, " {name}=\"{name}\"").map_err(fmt_err)?,
                },
                value => {
                    let text = attr_text(value)?;
                    write!(out, " {name}={}", quote_attr(&text)).map_err(fmt_err)?;
                }
            }
        }
        Ok(())
    }
}

impl Tag for MarkupTag {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_void(&self) -> bool {
        self.void
    }

    fn expand(
        &self,
        body: Body<'_>,
        attrs: &[Value],
        kwattrs: &[(String, Value)],
    ) -> Result<String> {
        if self.void && !body.is_empty() {
            return Err(Error::void_body(&self.name));
        }
        let mut out = String::new();
        out.push('<');
        out.push_str(&self.name);
        self.write_attrs(&mut out, attrs, kwattrs)?;
        if self.void {
            match self.mode {
                Mode::Html => out.push('>'),
                Mode::Xhtml => out.push_str(" />"),
            }
            return Ok(out);
        }
        out.push('>');
        let body = body.render()?;
        out.push_str(&body);
        // An outlined body puts the closing tag on its own line.
        if body.starts_with('\n') && !body.ends_with('\n') {
            out.push('\n');
        }
        write!(out, "</{}>", self.name).map_err(fmt_err)?;
        Ok(out)
    }
}

impl Registry {
    /// Builds the registry of markup tags for the given dialect.
    pub fn markup(mode: Mode) -> Self {
        let mut registry = Self::default();
        for name in ELEMENTS {
            registry.insert(Arc::new(MarkupTag::new(*name, false, mode)));
        }
        for name in VOID_ELEMENTS {
            registry.insert(Arc::new(MarkupTag::new(*name, true, mode)));
        }
        registry
    }

    pub fn insert(&mut self, tag: Arc<dyn Tag>) {
        self.tags.insert(tag.name().to_owned(), tag);
    }

    /// Looks up a tag by name, falling back to the lowercase name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tag>> {
        self.tags
            .get(name)
            .or_else(|| self.tags.get(&name.to_lowercase()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn Tag>)> {
        self.tags.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Quotes an attribute value.
///
/// Double quotes are used unless the value contains one, then single
/// quotes. A value containing both is entity-escaped inside double quotes.
pub fn quote_attr(value: &str) -> String {
    match (value.contains('"'), value.contains('\'')) {
        (false, _) => format!("\"{value}\""),
        (true, false) => format!("'{value}'"),
        (true, true) => {
            let escaped = value
                .replace('&', "&amp;")
                .replace('<', "&lt;")
                .replace('>', "&gt;")
                .replace('"', "&quot;");
            format!("\"{escaped}\"")
        }
    }
}

fn attr_text(value: &Value) -> Result<String> {
    match value {
        Value::List(items) => {
            let parts = items.iter().map(Value::to_text).collect::<Result<Vec<_>>>()?;
            Ok(parts.join(" "))
        }
        value => value.to_text(),
    }
}

fn fmt_err(_: std::fmt::Error) -> Error {
    Error::format(crate::fmt::Error::from("failed to write markup"))
}
