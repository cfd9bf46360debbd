//! AST representing a hypertag script.
//!
//! The textual grammar lives outside this crate. A parser produces a
//! [`Template`] made of [`Block`]s which the engine then analyses and
//! translates into a document tree.
//!
//! # Indentation
//!
//! Every block that starts on its own line carries a [`Layout`] whose
//! `indent` is the whitespace it is indented by relative to the nearest
//! enclosing block that produces a node (a tag, text or embed block).
//! Control blocks (`if`, `for`) and definitions are transparent: they add no
//! indentation of their own. The top-level blocks of a hypertag body are
//! indented relative to the place the hypertag is called from, so they
//! normally have an empty indent.
//!
//! The constructors on this module's types exist so that hand-built trees
//! read naturally; a parser is free to fill the public fields directly.

use std::cell::Cell;
use std::rc::Rc;

use crate::types::span::Span;
use crate::Value;

/// A complete script.
#[derive(Debug, Clone, Default)]
pub struct Template {
    /// The script source, used to point at errors. May be empty.
    pub source: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone)]
pub enum Block {
    Text(TextBlock),
    Tag(TagBlock),
    Embed(EmbedBlock),
    Hypertag(Rc<HypertagDef>),
    Assign(Assign),
    Context(Context),
    Import(Import),
    If(IfBlock),
    For(ForBlock),
}

/// Where a block sits relative to the previous output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    /// Whether the block starts on its own line.
    pub outline: bool,
    /// Indentation relative to the enclosing node-producing block.
    pub indent: String,
}

#[derive(Debug, Clone)]
pub struct TextBlock {
    pub parts: Vec<Part>,
    pub layout: Layout,
}

#[derive(Debug, Clone)]
pub enum Part {
    Raw(String),
    Expr(Expr),
}

#[derive(Debug, Clone)]
pub struct TagBlock {
    pub name: Ident,
    pub args: Vec<Arg>,
    pub body: Vec<Block>,
    pub layout: Layout,
}

#[derive(Debug, Clone)]
pub enum Arg {
    Positional(Expr),
    Named(Ident, Expr),
}

#[derive(Debug, Clone)]
pub struct EmbedBlock {
    pub expr: Expr,
    pub layout: Layout,
}

/// A hypertag definition.
#[derive(Debug, Clone)]
pub struct HypertagDef {
    pub name: Ident,
    pub params: Vec<Param>,
    /// The name the caller's body is bound to. A hypertag without a body
    /// parameter is void.
    pub body_param: Option<Ident>,
    pub body: Vec<Block>,
    pub(crate) ref_depth: Cell<Option<usize>>,
}

#[derive(Debug, Clone)]
pub struct Param {
    pub name: Ident,
    pub default: Option<Expr>,
}

#[derive(Debug, Clone)]
pub struct Assign {
    pub name: Ident,
    pub expr: Expr,
}

/// Declares variables that are supplied by the caller at render time.
#[derive(Debug, Clone)]
pub struct Context {
    pub names: Vec<Ident>,
}

#[derive(Debug, Clone)]
pub struct Import {
    pub path: String,
    pub items: ImportItems,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum ImportItems {
    /// Every public symbol of the module.
    All,
    /// The listed symbols, with their namespace prefix (`%name` or `$name`).
    Some(Vec<Ident>),
}

#[derive(Debug, Clone)]
pub struct IfBlock {
    pub cond: Expr,
    pub then_branch: Vec<Block>,
    pub else_branch: Option<Vec<Block>>,
}

#[derive(Debug, Clone)]
pub struct ForBlock {
    pub var: Ident,
    pub iterable: Expr,
    pub body: Vec<Block>,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Literal(Literal),
    Var(Var),
    /// A hypertag used as a value, `%name`.
    TagRef(Ident),
    List(Vec<Expr>),
    Not(Box<Expr>),
    /// String concatenation of the formatted parts.
    Concat(Vec<Expr>),
    Filter(Filter),
}

#[derive(Debug, Clone)]
pub struct Literal {
    pub value: Value,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub struct Var {
    pub name: Ident,
    pub path: Vec<Key>,
}

#[derive(Debug, Clone)]
pub enum Key {
    List(Index),
    Map(Ident),
}

#[derive(Debug, Clone, Copy)]
pub struct Index {
    pub value: usize,
    pub span: Span,
}

/// Application of a function value, `receiver : name(args)`.
#[derive(Debug, Clone)]
pub struct Filter {
    pub receiver: Box<Expr>,
    pub name: Ident,
    pub args: Vec<Expr>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

////////////////////////////////////////////////////////////////////////////////
// Constructors
////////////////////////////////////////////////////////////////////////////////

impl Template {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self {
            source: String::new(),
            blocks,
        }
    }

    pub fn with_source(source: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            source: source.into(),
            blocks,
        }
    }
}

impl Layout {
    pub fn inline() -> Self {
        Self::default()
    }

    pub fn outline(indent: impl Into<String>) -> Self {
        Self {
            outline: true,
            indent: indent.into(),
        }
    }
}

impl Block {
    /// An inline text block containing only raw text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(TextBlock {
            parts: vec![Part::Raw(text.into())],
            layout: Layout::inline(),
        })
    }

    /// An inline text block made of raw text and expressions.
    pub fn parts(parts: Vec<Part>) -> Self {
        Self::Text(TextBlock {
            parts,
            layout: Layout::inline(),
        })
    }

    pub fn tag(name: &str, args: Vec<Arg>, body: Vec<Block>) -> Self {
        Self::Tag(TagBlock {
            name: Ident::new(name),
            args,
            body,
            layout: Layout::inline(),
        })
    }

    pub fn embed(expr: Expr) -> Self {
        Self::Embed(EmbedBlock {
            expr,
            layout: Layout::inline(),
        })
    }

    pub fn hypertag(def: HypertagDef) -> Self {
        Self::Hypertag(Rc::new(def))
    }

    pub fn assign(name: &str, expr: Expr) -> Self {
        Self::Assign(Assign {
            name: Ident::new(name),
            expr,
        })
    }

    pub fn context(names: &[&str]) -> Self {
        Self::Context(Context {
            names: names.iter().map(|n| Ident::new(n)).collect(),
        })
    }

    pub fn import(path: &str, items: ImportItems) -> Self {
        Self::Import(Import {
            path: path.to_owned(),
            items,
            span: Span::default(),
        })
    }

    pub fn if_else(cond: Expr, then_branch: Vec<Block>, else_branch: Option<Vec<Block>>) -> Self {
        Self::If(IfBlock {
            cond,
            then_branch,
            else_branch,
        })
    }

    pub fn for_loop(var: &str, iterable: Expr, body: Vec<Block>) -> Self {
        Self::For(ForBlock {
            var: Ident::new(var),
            iterable,
            body,
        })
    }

    /// Places the block on its own line, indented by `indent`.
    ///
    /// Has no effect on blocks that are transparent to indentation.
    pub fn outline(mut self, indent: &str) -> Self {
        if let Some(layout) = self.layout_mut() {
            *layout = Layout::outline(indent);
        }
        self
    }

    pub fn layout(&self) -> Option<&Layout> {
        match self {
            Self::Text(b) => Some(&b.layout),
            Self::Tag(b) => Some(&b.layout),
            Self::Embed(b) => Some(&b.layout),
            _ => None,
        }
    }

    fn layout_mut(&mut self) -> Option<&mut Layout> {
        match self {
            Self::Text(b) => Some(&mut b.layout),
            Self::Tag(b) => Some(&mut b.layout),
            Self::Embed(b) => Some(&mut b.layout),
            _ => None,
        }
    }
}

impl HypertagDef {
    pub fn new(name: &str, params: Vec<Param>, body_param: Option<&str>, body: Vec<Block>) -> Self {
        Self {
            name: Ident::new(name),
            params,
            body_param: body_param.map(Ident::new),
            body,
            ref_depth: Cell::new(None),
        }
    }

    /// The depth of the shallowest definition this hypertag's body reads,
    /// as computed by analysis.
    ///
    /// Symbols from the environment count as depth `0`, the script's top
    /// level as `1` and each hypertag body one deeper than its definition.
    /// `None` means the body reads nothing at all.
    pub fn ref_depth(&self) -> Option<usize> {
        self.ref_depth.get()
    }
}

impl Param {
    pub fn new(name: &str) -> Self {
        Self {
            name: Ident::new(name),
            default: None,
        }
    }

    pub fn with_default(name: &str, default: Expr) -> Self {
        Self {
            name: Ident::new(name),
            default: Some(default),
        }
    }
}

impl From<&str> for Part {
    fn from(raw: &str) -> Self {
        Self::Raw(raw.to_owned())
    }
}

impl From<Expr> for Part {
    fn from(expr: Expr) -> Self {
        Self::Expr(expr)
    }
}

impl Arg {
    pub fn positional(expr: Expr) -> Self {
        Self::Positional(expr)
    }

    pub fn named(name: &str, expr: Expr) -> Self {
        Self::Named(Ident::new(name), expr)
    }
}

impl Expr {
    pub fn lit(value: impl Into<Value>) -> Self {
        Self::Literal(Literal {
            value: value.into(),
            span: Span::default(),
        })
    }

    pub fn var(name: &str) -> Self {
        Self::Var(Var {
            name: Ident::new(name),
            path: Vec::new(),
        })
    }

    /// A variable followed by an index path, e.g. `user.names.0`.
    ///
    /// Segments that parse as integers index into lists.
    pub fn path(name: &str, path: &[&str]) -> Self {
        let path = path
            .iter()
            .map(|p| match p.parse::<usize>() {
                Ok(value) => Key::List(Index {
                    value,
                    span: Span::default(),
                }),
                Err(_) => Key::Map(Ident::new(p)),
            })
            .collect();
        Self::Var(Var {
            name: Ident::new(name),
            path,
        })
    }

    pub fn tag_ref(name: &str) -> Self {
        Self::TagRef(Ident::new(name))
    }

    pub fn filter(receiver: Expr, name: &str, args: Vec<Expr>) -> Self {
        Self::Filter(Filter {
            receiver: Box::new(receiver),
            name: Ident::new(name),
            args,
        })
    }

    pub fn span(&self) -> Span {
        match self {
            Self::Literal(lit) => lit.span,
            Self::Var(var) => var.span(),
            Self::TagRef(ident) => ident.span,
            Self::List(items) | Self::Concat(items) => items
                .iter()
                .map(Expr::span)
                .reduce(Span::combine)
                .unwrap_or_default(),
            Self::Not(expr) => expr.span(),
            Self::Filter(filter) => filter.receiver.span().combine(filter.name.span),
        }
    }
}

impl Var {
    pub fn span(&self) -> Span {
        self.path
            .iter()
            .map(Key::span)
            .fold(self.name.span, Span::combine)
    }
}

impl Key {
    pub fn span(&self) -> Span {
        match self {
            Key::List(key) => key.span,
            Key::Map(key) => key.span,
        }
    }
}

impl Ident {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            span: Span::default(),
        }
    }

    pub fn with_span(name: &str, span: impl Into<Span>) -> Self {
        Self {
            name: name.to_owned(),
            span: span.into(),
        }
    }
}
