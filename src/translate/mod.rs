//! Translation of an analysed script into a document tree.
//!
//! Blocks are translated depth first while the scope stack tracks both the
//! visible bindings and the absolute indentation of the current block.
//! Every node is built with absolute indentation and demoted to relative
//! indentation when its parent is built.
//!
//! Tags implemented in Rust become elements that are expanded when the
//! document is rendered. Hypertags defined in the script are expanded right
//! away: their body is translated on a branch of the scope they were defined
//! in and the resulting nodes take the place of the call.

mod expr;

use std::rc::Rc;

use crate::analyze::{tag, var};
use crate::dom::{del_indent, get_indent};
use crate::dom::{Document, Element, ElementOptions, Indent, Node, Sequence, Text};
use crate::fmt::{FormatFn, Formatter};
use crate::runtime::Environment;
use crate::scope::{Closure, ScopeStack};
use crate::tag::Hypertag;
use crate::translate::expr::eval;
use crate::types::ast;
use crate::types::span::Span;
use crate::value::{LazyValue, Map};
use crate::{Error, Result, Value};

/// Translates a template into a document.
pub(crate) fn template(
    template: &ast::Template,
    env: &dyn Environment,
    formatter: &FormatFn,
    context: &Map<String, Value>,
) -> Result<Document> {
    let translator = Translator {
        source: Rc::from(template.source.as_str()),
        env,
        formatter,
        context,
    };
    let mut scope = Scope {
        stack: ScopeStack::new(),
        depth: 1,
    };
    for (symbol, value) in env.import_default()? {
        scope.stack.push(symbol, value);
    }
    let mut nodes = Vec::new();
    translator.blocks(&mut scope, &template.blocks, &mut nodes)?;
    Document::new(Sequence::from_nodes(nodes))
}

struct Translator<'a> {
    source: Rc<str>,
    env: &'a dyn Environment,
    formatter: &'a FormatFn,
    context: &'a Map<String, Value>,
}

/// The bindings visible to the blocks being translated and the depth of
/// the definition they belong to.
struct Scope {
    stack: ScopeStack<Value>,
    depth: usize,
}

impl Translator<'_> {
    fn blocks(&self, scope: &mut Scope, blocks: &[ast::Block], out: &mut Vec<Node>) -> Result<()> {
        for block in blocks {
            self.block(scope, block, out)?;
        }
        Ok(())
    }

    /// Translates blocks whose bindings are not visible after them.
    fn scoped(&self, scope: &mut Scope, blocks: &[ast::Block], out: &mut Vec<Node>) -> Result<()> {
        let checkpoint = scope.stack.checkpoint();
        self.blocks(scope, blocks, out)?;
        scope.stack.reset(checkpoint)
    }

    fn block(&self, scope: &mut Scope, block: &ast::Block, out: &mut Vec<Node>) -> Result<()> {
        match block {
            ast::Block::Text(text) => self.laid_out(scope, &text.layout, |scope, abs| {
                let mut buf = String::new();
                for part in &text.parts {
                    match part {
                        ast::Part::Raw(raw) => buf.push_str(raw),
                        ast::Part::Expr(expr) => {
                            let value = self.eval(scope, expr)?;
                            self.write_value(&mut buf, &value, expr.span())?;
                        }
                    }
                }
                let node = Node::Text(Text::new(dedent_tail(&buf)));
                match abs {
                    Some(abs) => {
                        let group = Element::group(
                            Sequence::from_nodes(vec![node]),
                            true,
                            Some(Indent::Absolute(abs)),
                        )?;
                        out.push(group.into());
                    }
                    None => out.push(node),
                }
                Ok(())
            }),

            ast::Block::Tag(block) => {
                let hypertag = self.resolve_tag(scope, &block.name)?;
                let (attrs, kwattrs) = self.args(scope, &block.args)?;
                self.laid_out(scope, &block.layout, |scope, abs| {
                    let indent = match &abs {
                        Some(abs) => abs.clone(),
                        None => scope.stack.indentation().to_owned(),
                    };
                    let mut body = Vec::new();
                    self.scoped(scope, &block.body, &mut body)?;
                    match hypertag {
                        Hypertag::External(tag) => {
                            let options = ElementOptions {
                                tag: Some(tag),
                                attrs,
                                kwattrs,
                                outline: abs.is_some(),
                                indent: abs.map(Indent::Absolute),
                            };
                            let element = Element::new(Sequence::from_nodes(body), options)
                                .map_err(|e| e.with_span(&self.source, block.name.span))?;
                            out.push(element.into());
                            Ok(())
                        }
                        Hypertag::Native(closure) => {
                            let call = Call {
                                args: attrs,
                                kwargs: kwattrs,
                                body,
                                indent: &indent,
                                span: block.name.span,
                            };
                            let nodes = self.invoke(&closure, call)?;
                            push_outlined(out, nodes, abs)
                        }
                    }
                })
            }

            ast::Block::Embed(embed) => {
                let value = self.eval(scope, &embed.expr)?;
                let seq = Sequence::new([value])
                    .map_err(|e| e.with_span(&self.source, embed.expr.span()))?;
                self.laid_out(scope, &embed.layout, |scope, abs| {
                    let base = match &abs {
                        Some(abs) => abs.clone(),
                        None => scope.stack.indentation().to_owned(),
                    };
                    let mut nodes = seq.into_nodes();
                    for node in &mut nodes {
                        node.rebase(&base);
                    }
                    tracing::debug!(nodes = nodes.len(), base = ?base, "embedding nodes");
                    push_outlined(out, nodes, abs)
                })
            }

            ast::Block::Hypertag(def) => {
                let branch = scope.stack.branch();
                let defaults = def
                    .params
                    .iter()
                    .map(|param| {
                        param.default.clone().map(|expr| {
                            let branch = branch.clone();
                            let source = self.source.clone();
                            LazyValue::new(move || {
                                let stack = ScopeStack::on_branch(branch.clone(), "\n");
                                eval(&stack, &source, &expr)
                            })
                        })
                    })
                    .collect();
                let closure = Closure::new(def.clone(), branch, scope.depth, defaults);
                tracing::debug!(
                    name = %def.name.name,
                    depth = scope.depth,
                    ref_depth = ?def.ref_depth(),
                    "defined hypertag"
                );
                scope
                    .stack
                    .push(tag(&def.name.name), Value::Hypertag(Hypertag::Native(closure)));
                Ok(())
            }

            ast::Block::Assign(assign) => {
                let value = self.eval(scope, &assign.expr)?;
                scope.stack.push(var(&assign.name.name), value);
                Ok(())
            }

            ast::Block::Context(context) => {
                for name in &context.names {
                    let value = self.context.get(&name.name).cloned().ok_or_else(|| {
                        Error::undefined(&var(&name.name)).with_span(&self.source, name.span)
                    })?;
                    scope.stack.push(var(&name.name), value);
                }
                Ok(())
            }

            ast::Block::Import(import) => {
                match &import.items {
                    ast::ImportItems::All => {
                        let symbols = self
                            .env
                            .import_all(&import.path)
                            .map_err(|e| e.with_span(&self.source, import.span))?;
                        tracing::debug!(path = %import.path, symbols = symbols.len(), "imported module");
                        for (symbol, value) in symbols {
                            scope.stack.push(symbol, value);
                        }
                    }
                    ast::ImportItems::Some(items) => {
                        for item in items {
                            let value = self
                                .env
                                .import_one(&item.name, &import.path)
                                .map_err(|e| e.with_span(&self.source, item.span))?;
                            tracing::debug!(path = %import.path, symbol = %item.name, "imported symbol");
                            scope.stack.push(item.name.clone(), value);
                        }
                    }
                }
                Ok(())
            }

            ast::Block::If(block) => {
                if self.eval(scope, &block.cond)?.is_truthy() {
                    self.scoped(scope, &block.then_branch, out)
                } else if let Some(else_branch) = &block.else_branch {
                    self.scoped(scope, else_branch, out)
                } else {
                    Ok(())
                }
            }

            ast::Block::For(block) => {
                let items = match self.eval(scope, &block.iterable)? {
                    Value::List(items) => items,
                    value => {
                        return Err(Error::type_error(format!(
                            "expected iterable, but expression evaluated to {}",
                            value.human()
                        ))
                        .with_span(&self.source, block.iterable.span()));
                    }
                };
                let checkpoint = scope.stack.checkpoint();
                scope.stack.push(var(&block.var.name), Value::None);
                let index = scope.stack.len() - 1;
                for item in items {
                    scope.stack.set(index, item)?;
                    self.scoped(scope, &block.body, out)?;
                }
                scope.stack.reset(checkpoint)
            }
        }
    }

    /// Runs `f` with the indentation of a block applied.
    ///
    /// `f` receives the block's absolute indentation if the block starts on
    /// its own line.
    fn laid_out<F>(&self, scope: &mut Scope, layout: &ast::Layout, f: F) -> Result<()>
    where
        F: FnOnce(&mut Scope, Option<String>) -> Result<()>,
    {
        if !layout.outline {
            return f(scope, None);
        }
        if let Some(ch) = layout.indent.chars().find(|c| *c != ' ' && *c != '\t') {
            return Err(Error::malformed_indent(format!(
                "indentation contains non-whitespace character {ch:?}"
            )));
        }
        for ch in layout.indent.chars() {
            scope.stack.indent(ch);
        }
        let abs = scope.stack.indentation().to_owned();
        f(scope, Some(abs))?;
        for _ in layout.indent.chars() {
            scope.stack.dedent()?;
        }
        Ok(())
    }

    fn eval(&self, scope: &Scope, expr: &ast::Expr) -> Result<Value> {
        eval(&scope.stack, &self.source, expr)
    }

    fn write_value(&self, buf: &mut String, value: &Value, span: Span) -> Result<()> {
        match value {
            Value::Nodes(seq) => buf.push_str(&seq.render()?),
            value => {
                let mut f = Formatter::with_string(buf);
                (self.formatter)(&mut f, value)
                    .map_err(|e| Error::format(e).with_span(&self.source, span))?;
            }
        }
        Ok(())
    }

    /// Resolves a tag name to the most recent callable binding, either a
    /// hypertag or a variable holding one.
    fn resolve_tag(&self, scope: &Scope, name: &ast::Ident) -> Result<Hypertag> {
        let defined = scope.stack.lookup(&tag(&name.name));
        let held = scope.stack.lookup(&var(&name.name));
        match (defined, held) {
            (Some((i, Value::Hypertag(defined))), Some((j, Value::Hypertag(held)))) => {
                Ok(if j > i { held } else { defined })
            }
            (Some((_, Value::Hypertag(hypertag))), _) => Ok(hypertag),
            (_, Some((_, Value::Hypertag(hypertag)))) => Ok(hypertag),
            (_, Some((_, value))) => Err(Error::type_error(format!(
                "expected hypertag, but `{}` is {}",
                var(&name.name),
                value.human()
            ))
            .with_span(&self.source, name.span)),
            (_, None) => {
                Err(Error::undefined(&tag(&name.name)).with_span(&self.source, name.span))
            }
        }
    }

    fn args(&self, scope: &Scope, args: &[ast::Arg]) -> Result<(Vec<Value>, Vec<(String, Value)>)> {
        let mut positional = Vec::new();
        let mut named = Vec::new();
        for arg in args {
            match arg {
                ast::Arg::Positional(expr) => positional.push(self.eval(scope, expr)?),
                ast::Arg::Named(name, expr) => {
                    named.push((name.name.clone(), self.eval(scope, expr)?));
                }
            }
        }
        Ok((positional, named))
    }

    /// Expands a hypertag defined in the script.
    fn invoke(&self, closure: &Closure, call: Call<'_>) -> Result<Vec<Node>> {
        let def = closure.def();
        let name = &def.name.name;
        let err = |msg: String| Error::type_error(msg).with_span(&self.source, call.span);

        if def.body_param.is_none() && !call.body.is_empty() {
            return Err(Error::void_body(name).with_span(&self.source, call.span));
        }
        if call.args.len() > def.params.len() {
            return Err(err(format!(
                "hypertag `{name}` takes {} argument(s) but {} were given",
                def.params.len(),
                call.args.len()
            )));
        }
        let mut values: Vec<Option<Value>> = vec![None; def.params.len()];
        for (slot, value) in values.iter_mut().zip(call.args) {
            *slot = Some(value);
        }
        for (key, value) in call.kwargs {
            let i = def
                .params
                .iter()
                .position(|p| p.name.name == key)
                .ok_or_else(|| err(format!("hypertag `{name}` has no parameter `{key}`")))?;
            if values[i].is_some() {
                return Err(err(format!(
                    "hypertag `{name}` got multiple values for parameter `{key}`"
                )));
            }
            values[i] = Some(value);
        }

        let mut stack = ScopeStack::on_branch(closure.branch().clone(), call.indent);
        for (i, (param, value)) in def.params.iter().zip(values).enumerate() {
            let value = match (value, closure.default(i)) {
                (Some(value), _) => value,
                (None, Some(default)) => default.get()?,
                (None, None) => {
                    return Err(err(format!(
                        "hypertag `{name}` is missing argument `{}`",
                        param.name.name
                    )));
                }
            };
            stack.push(var(&param.name.name), value);
        }
        if let Some(body_param) = &def.body_param {
            let mut body = call.body;
            let base = body_base(&body).unwrap_or(call.indent).to_owned();
            for node in &mut body {
                node.relative_indent(&base)?;
            }
            stack.push(var(&body_param.name), Value::Nodes(Sequence::from_nodes(body)));
        }

        tracing::debug!(
            name = %name,
            depth = closure.depth() + 1,
            ref_depth = ?closure.ref_depth(),
            "invoking hypertag"
        );
        let mut scope = Scope {
            stack,
            depth: closure.depth() + 1,
        };
        let mut out = Vec::new();
        self.blocks(&mut scope, &def.body, &mut out)?;
        Ok(out)
    }
}

/// The arguments of a hypertag call.
struct Call<'a> {
    args: Vec<Value>,
    kwargs: Vec<(String, Value)>,
    body: Vec<Node>,
    /// The absolute indentation of the call.
    indent: &'a str,
    span: Span,
}

/// Removes the indentation shared by the lines after the first.
fn dedent_tail(text: &str) -> String {
    match text.split_once('\n') {
        Some((head, tail)) => {
            let indent = get_indent(tail);
            format!("{head}\n{}", del_indent(tail, indent))
        }
        None => text.to_owned(),
    }
}

/// The shortest absolute indentation among the outermost indented nodes.
fn body_base(nodes: &[Node]) -> Option<&str> {
    let mut found: Option<&str> = None;
    for node in nodes {
        let candidate = match node.indent() {
            Some(Indent::Absolute(indent)) => Some(indent.as_str()),
            Some(Indent::Relative(_)) => None,
            None => node
                .body()
                .and_then(|body| body_base(body.iter().as_slice())),
        };
        if let Some(candidate) = candidate {
            if found.map_or(true, |f| candidate.len() < f.len()) {
                found = Some(candidate);
            }
        }
    }
    found
}

/// Appends the nodes that replace an outline block.
///
/// Inline nodes at the start are grouped on a line of their own so that the
/// block keeps starting on a new line.
fn push_outlined(out: &mut Vec<Node>, mut nodes: Vec<Node>, abs: Option<String>) -> Result<()> {
    let abs = match abs {
        Some(abs) => abs,
        None => {
            out.extend(nodes);
            return Ok(());
        }
    };
    let split = nodes.iter().position(Node::outline).unwrap_or(nodes.len());
    if split == 0 {
        out.extend(nodes);
        return Ok(());
    }
    let rest = nodes.split_off(split);
    let group = Element::group(Sequence::from_nodes(nodes), true, Some(Indent::Absolute(abs)))?;
    out.push(group.into());
    out.extend(rest);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedent_tail_keeps_headline() {
        assert_eq!(dedent_tail("head\n    a\n      b"), "head\na\n  b");
        assert_eq!(dedent_tail("single"), "single");
        assert_eq!(dedent_tail("  x\n"), "  x\n");
    }

    #[test]
    fn push_outlined_groups_leading_inline_nodes() {
        let text = |s: &str| Node::Text(Text::new(s));
        let mut out = Vec::new();
        push_outlined(&mut out, vec![text("a"), text("b")], Some("\n  ".to_owned())).unwrap();
        assert_eq!(out.len(), 1);
        assert!(out[0].outline());

        let mut out = Vec::new();
        push_outlined(&mut out, vec![text("a")], None).unwrap();
        assert!(!out[0].outline());
    }
}
