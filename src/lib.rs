//! The core of the Hypertag document templating language.
//!
//! Hypertag scripts describe a document with indentation: every block
//! starting on its own line nests under the block above it that is indented
//! less. Blocks call *hypertags*, parameterised reusable blocks which are
//! either implemented in Rust (like the builtin HTML tags) or defined in the
//! script itself. Hypertags defined in a script are values: they can be
//! assigned, passed as arguments and called far from their definition while
//! still seeing the scope they were defined in.
//!
//! This crate takes a parsed script, an [`ast::Template`], and turns it into
//! text in three steps.
//!
//! - [`Engine::compile`] resolves every symbol the script reads and records
//!   which definitions each hypertag depends on.
//! - [`Template::translate`] evaluates the script into a [`Document`], a tree
//!   of [`Node`]s with indentation relative to their parents.
//! - [`Document::render`] expands the tags attached to elements and
//!   reassembles the text with indentation applied.
//!
//! # Getting started
//!
//! ```
//! use hypertag::ast::{Arg, Block, Expr, HypertagDef, Param, Template};
//! use hypertag::Engine;
//!
//! // %greet name
//! //     p | Hello $name!
//! // div
//! //     greet "World"
//! let template = Template::new(vec![
//!     Block::hypertag(HypertagDef::new(
//!         "greet",
//!         vec![Param::new("name")],
//!         None,
//!         vec![Block::tag(
//!             "p",
//!             vec![],
//!             vec![Block::parts(vec![
//!                 "Hello ".into(),
//!                 Expr::var("name").into(),
//!                 "!".into(),
//!             ])],
//!         )
//!         .outline("")],
//!     )),
//!     Block::tag(
//!         "div",
//!         vec![],
//!         vec![Block::tag("greet", vec![Arg::positional(Expr::lit("World"))], vec![])
//!             .outline("    ")],
//!     )
//!     .outline(""),
//! ]);
//!
//! let engine = Engine::new();
//! let result = engine.compile(template)?.render_from(&Default::default())?;
//! assert_eq!(result, "<div>\n    <p>Hello World!</p>\n</div>");
//! # Ok::<(), hypertag::Error>(())
//! ```
//!
//! # Rendering with context
//!
//! Variables declared with a context block are supplied when rendering,
//! either as a map of [`Value`]s or, with the `serde` feature, as any
//! serializable value.
//!
//! ```
//! use hypertag::ast::{Block, Expr, Part, Template};
//! use hypertag::Engine;
//!
//! #[derive(serde::Serialize)]
//! struct Context { user: User }
//!
//! #[derive(serde::Serialize)]
//! struct User { name: String }
//!
//! let template = Template::new(vec![
//!     Block::context(&["user"]),
//!     Block::parts(vec![Part::Raw("Hi ".into()), Part::Expr(Expr::path("user", &["name"]))]),
//! ]);
//!
//! let ctx = Context { user: User { name: "John Smith".into() } };
//! let result = Engine::new().compile(template)?.render(&ctx)?;
//! assert_eq!(result, "Hi John Smith");
//! # Ok::<(), hypertag::Error>(())
//! ```

mod analyze;
mod dom;
mod error;
pub mod fmt;
mod runtime;
mod scope;
mod tag;
mod translate;
mod types;
mod value;

use std::fmt as std_fmt;

pub use crate::dom::{
    add_indent, del_indent, get_indent, Content, Document, Element, ElementOptions, Indent, Node,
    Selector, Sequence, Text,
};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::runtime::{Environment, Runtime, BUILTINS};
pub use crate::scope::{Checkpoint, Closure, ScopeStack, StackBranch};
pub use crate::tag::{
    quote_attr, Body, Hypertag, MarkupTag, Mode, Registry, Tag, HTML, XHTML,
};
pub use crate::types::ast;
pub use crate::types::span::Span;
#[cfg(feature = "serde")]
pub use crate::value::to_value;
pub use crate::value::{Function, LazyValue, Map, Value};

use crate::fmt::{FormatFn, Formatter};

/// The compilation and translation engine.
///
/// The engine holds the [`Environment`] scripts import symbols from and the
/// formatter used to write expression values into text. Generally, you only
/// need to construct one engine during the lifetime of a program.
pub struct Engine {
    runtime: Box<dyn Environment>,
    default_formatter: Box<FormatFn>,
}

/// A compiled template.
pub struct Template<'engine> {
    engine: &'engine Engine,
    template: ast::Template,
    ref_depth: Option<usize>,
}

impl Default for Engine {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    /// Construct a new engine using a [`Runtime`] over the [`HTML`] tags.
    #[inline]
    pub fn new() -> Self {
        Self::with_runtime(Runtime::new())
    }

    /// Construct a new engine with a custom environment.
    ///
    /// # Examples
    ///
    /// ```
    /// use hypertag::{Engine, Runtime, XHTML};
    ///
    /// let engine = Engine::with_runtime(Runtime::with_registry(&XHTML));
    /// ```
    #[inline]
    pub fn with_runtime<E>(runtime: E) -> Self
    where
        E: Environment + 'static,
    {
        Self {
            runtime: Box::new(runtime),
            default_formatter: Box::new(fmt::default),
        }
    }

    /// Set the default formatter.
    #[inline]
    pub fn set_default_formatter<F>(&mut self, f: F)
    where
        F: Fn(&mut Formatter<'_>, &Value) -> fmt::Result + Sync + Send + 'static,
    {
        self.default_formatter = Box::new(f);
    }

    /// Returns the environment scripts import symbols from.
    #[inline]
    pub fn runtime(&self) -> &dyn Environment {
        self.runtime.as_ref()
    }

    /// Compile a template.
    ///
    /// Every symbol the template reads is resolved, so an undefined symbol
    /// fails here rather than when rendering.
    pub fn compile(&self, template: ast::Template) -> Result<Template<'_>> {
        let analysis = analyze::template(&template, self.runtime.as_ref())?;
        Ok(Template {
            engine: self,
            template,
            ref_depth: analysis.ref_depth,
        })
    }
}

impl std_fmt::Debug for Engine {
    fn fmt(&self, f: &mut std_fmt::Formatter<'_>) -> std_fmt::Result {
        f.debug_struct("Engine")
            .field("runtime", &self.runtime)
            .finish_non_exhaustive()
    }
}

impl<'engine> Template<'engine> {
    /// Translate the template into a document using the provided context.
    pub fn translate(&self, ctx: &Map<String, Value>) -> Result<Document> {
        translate::template(
            &self.template,
            self.engine.runtime.as_ref(),
            self.engine.default_formatter.as_ref(),
            ctx,
        )
    }

    /// Render the template to a string using the provided context.
    #[inline]
    pub fn render_from(&self, ctx: &Map<String, Value>) -> Result<String> {
        self.translate(ctx)?.render()
    }

    /// Render the template to a string using the provided value.
    ///
    /// The value must serialize to a map, or to nothing at all.
    #[cfg(feature = "serde")]
    #[inline]
    pub fn render<S>(&self, ctx: S) -> Result<String>
    where
        S: serde::Serialize,
    {
        self.render_from(&value::to_context(ctx)?)
    }

    /// The depth of the shallowest definition the template reads.
    ///
    /// `Some(0)` means the template reads only symbols from the
    /// environment or the context. `None` means it reads nothing.
    #[inline]
    pub fn ref_depth(&self) -> Option<usize> {
        self.ref_depth
    }

    /// Returns the template source.
    #[inline]
    pub fn source(&self) -> &str {
        &self.template.source
    }

    #[inline]
    pub fn ast(&self) -> &ast::Template {
        &self.template
    }
}

impl std_fmt::Debug for Template<'_> {
    fn fmt(&self, f: &mut std_fmt::Formatter<'_>) -> std_fmt::Result {
        f.debug_struct("Template")
            .field("engine", &self.engine)
            .field("ref_depth", &self.ref_depth)
            .finish_non_exhaustive()
    }
}
