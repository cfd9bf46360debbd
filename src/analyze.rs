//! Static analysis of a script.
//!
//! Resolves every symbol a script reads before anything is translated and
//! records, for each hypertag definition, the depth of the shallowest
//! definition its body reads. Symbols from the environment sit at depth `0`,
//! the script's top level at depth `1` and every hypertag body one deeper
//! than the place it is defined.

use crate::runtime::Environment;
use crate::scope::ScopeStack;
use crate::types::ast;
use crate::types::span::Span;
use crate::{Error, Result};

/// The depth of symbols that come from outside the script.
pub(crate) const EXTERNAL: usize = 0;

/// The summary of a successful analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Analysis {
    pub ref_depth: Option<usize>,
    pub hypertags: usize,
}

/// Analyses a template, storing reference depths in its hypertag
/// definitions.
pub(crate) fn template(template: &ast::Template, env: &dyn Environment) -> Result<Analysis> {
    let mut analyzer = Analyzer {
        source: &template.source,
        env,
        stack: ScopeStack::new(),
        refs: vec![None],
        depth: 1,
        hypertags: 0,
    };
    for (symbol, _) in env.import_default()? {
        analyzer.stack.push(symbol, EXTERNAL);
    }
    analyzer.blocks(&template.blocks)?;
    let analysis = Analysis {
        ref_depth: analyzer.refs.pop().flatten(),
        hypertags: analyzer.hypertags,
    };
    tracing::debug!(
        hypertags = analysis.hypertags,
        ref_depth = ?analysis.ref_depth,
        "analysed template"
    );
    Ok(analysis)
}

struct Analyzer<'a> {
    source: &'a str,
    env: &'a dyn Environment,
    /// The depth each visible symbol is defined at.
    stack: ScopeStack<usize>,
    /// The reference depth of each definition being analysed, innermost
    /// last. The first entry is the template itself.
    refs: Vec<Option<usize>>,
    depth: usize,
    hypertags: usize,
}

impl Analyzer<'_> {
    fn blocks(&mut self, blocks: &[ast::Block]) -> Result<()> {
        for block in blocks {
            self.block(block)?;
        }
        Ok(())
    }

    /// Analyses blocks whose bindings are not visible after them.
    fn scoped(&mut self, blocks: &[ast::Block]) -> Result<()> {
        let checkpoint = self.stack.checkpoint();
        self.blocks(blocks)?;
        self.stack.reset(checkpoint)
    }

    fn block(&mut self, block: &ast::Block) -> Result<()> {
        match block {
            ast::Block::Text(text) => {
                for part in &text.parts {
                    if let ast::Part::Expr(expr) = part {
                        self.expr(expr)?;
                    }
                }
            }

            ast::Block::Tag(tag) => {
                self.tag_name(&tag.name)?;
                for arg in &tag.args {
                    match arg {
                        ast::Arg::Positional(expr) | ast::Arg::Named(_, expr) => self.expr(expr)?,
                    }
                }
                self.scoped(&tag.body)?;
            }

            ast::Block::Embed(embed) => self.expr(&embed.expr)?,

            ast::Block::Hypertag(def) => self.hypertag(def)?,

            ast::Block::Assign(assign) => {
                self.expr(&assign.expr)?;
                self.stack.push(var(&assign.name.name), self.depth);
            }

            ast::Block::Context(context) => {
                for name in &context.names {
                    self.stack.push(var(&name.name), EXTERNAL);
                }
            }

            ast::Block::Import(import) => match &import.items {
                ast::ImportItems::All => {
                    let symbols = self
                        .env
                        .import_all(&import.path)
                        .map_err(|e| e.with_span(self.source, import.span))?;
                    for (symbol, _) in symbols {
                        self.stack.push(symbol, EXTERNAL);
                    }
                }
                ast::ImportItems::Some(items) => {
                    for item in items {
                        self.env
                            .import_one(&item.name, &import.path)
                            .map_err(|e| e.with_span(self.source, item.span))?;
                        self.stack.push(item.name.clone(), EXTERNAL);
                    }
                }
            },

            ast::Block::If(block) => {
                self.expr(&block.cond)?;
                self.scoped(&block.then_branch)?;
                if let Some(else_branch) = &block.else_branch {
                    self.scoped(else_branch)?;
                }
            }

            ast::Block::For(block) => {
                self.expr(&block.iterable)?;
                let checkpoint = self.stack.checkpoint();
                self.stack.push(var(&block.var.name), self.depth);
                self.blocks(&block.body)?;
                self.stack.reset(checkpoint)?;
            }
        }
        Ok(())
    }

    fn hypertag(&mut self, def: &ast::HypertagDef) -> Result<()> {
        // Defaults are evaluated where the hypertag is defined.
        for param in &def.params {
            if let Some(default) = &param.default {
                self.expr(default)?;
            }
        }

        let depth = self.depth + 1;
        let checkpoint = self.stack.checkpoint();
        self.depth = depth;
        self.refs.push(None);
        for param in &def.params {
            self.stack.push(var(&param.name.name), depth);
        }
        if let Some(body) = &def.body_param {
            self.stack.push(var(&body.name), depth);
        }
        let result = self.blocks(&def.body);
        let ref_depth = self.refs.pop().flatten();
        self.depth -= 1;
        self.stack.reset(checkpoint)?;
        result?;

        def.ref_depth.set(ref_depth);
        if let Some(d) = ref_depth {
            if d <= self.depth {
                self.reference(d);
            }
        }
        self.hypertags += 1;
        tracing::debug!(name = %def.name.name, depth, ref_depth = ?ref_depth, "analysed hypertag");

        self.stack.push(tag(&def.name.name), self.depth);
        Ok(())
    }

    /// Either namespace may supply the tag, and which one does is only known
    /// once values exist, so both visible bindings count as read.
    fn tag_name(&mut self, name: &ast::Ident) -> Result<()> {
        let defined = self.stack.lookup(&tag(&name.name));
        let held = self.stack.lookup(&var(&name.name));
        if defined.is_none() && held.is_none() {
            return Err(self.undefined(&tag(&name.name), name.span));
        }
        for (_, depth) in defined.into_iter().chain(held) {
            self.reference(depth);
        }
        Ok(())
    }

    fn expr(&mut self, expr: &ast::Expr) -> Result<()> {
        match expr {
            ast::Expr::Literal(_) => Ok(()),
            ast::Expr::Var(v) => self.symbol(&var(&v.name.name), v.name.span),
            ast::Expr::TagRef(name) => self.symbol(&tag(&name.name), name.span),
            ast::Expr::List(items) | ast::Expr::Concat(items) => {
                for item in items {
                    self.expr(item)?;
                }
                Ok(())
            }
            ast::Expr::Not(expr) => self.expr(expr),
            ast::Expr::Filter(filter) => {
                self.expr(&filter.receiver)?;
                self.symbol(&var(&filter.name.name), filter.name.span)?;
                for arg in &filter.args {
                    self.expr(arg)?;
                }
                Ok(())
            }
        }
    }

    fn symbol(&mut self, symbol: &str, span: Span) -> Result<()> {
        match self.stack.lookup(symbol) {
            Some((_, depth)) => {
                self.reference(depth);
                Ok(())
            }
            None => Err(self.undefined(symbol, span)),
        }
    }

    fn reference(&mut self, depth: usize) {
        if let Some(current) = self.refs.last_mut() {
            *current = Some(current.map_or(depth, |c| c.min(depth)));
        }
    }

    fn undefined(&self, symbol: &str, span: Span) -> Error {
        Error::undefined(symbol).with_span(self.source, span)
    }
}

pub(crate) fn var(name: &str) -> String {
    format!("${name}")
}

pub(crate) fn tag(name: &str) -> String {
    format!("%{name}")
}
