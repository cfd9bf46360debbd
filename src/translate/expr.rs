use crate::analyze::{tag, var};
use crate::scope::ScopeStack;
use crate::types::ast;
use crate::types::span::Span;
use crate::{Error, Result, Value};

/// Evaluates an expression against the visible bindings.
pub(crate) fn eval(stack: &ScopeStack<Value>, source: &str, expr: &ast::Expr) -> Result<Value> {
    match expr {
        ast::Expr::Literal(lit) => Ok(lit.value.clone()),

        ast::Expr::Var(v) => {
            let value = resolve(stack, source, &var(&v.name.name), v.name.span)?;
            lookup_path(source, value, &v.path)
        }

        ast::Expr::TagRef(name) => {
            let value = resolve(stack, source, &tag(&name.name), name.span)?;
            match value {
                Value::Hypertag(_) => Ok(value),
                value => Err(Error::type_error(format!(
                    "expected hypertag, found {}",
                    value.human()
                ))
                .with_span(source, name.span)),
            }
        }

        ast::Expr::List(items) => items
            .iter()
            .map(|item| eval(stack, source, item))
            .collect::<Result<Vec<_>>>()
            .map(Value::List),

        ast::Expr::Not(inner) => Ok(Value::Bool(!eval(stack, source, inner)?.is_truthy())),

        ast::Expr::Concat(items) => {
            let mut out = String::new();
            for item in items {
                let value = eval(stack, source, item)?;
                let text = value.to_text().map_err(|e| e.with_span(source, item.span()))?;
                out.push_str(&text);
            }
            Ok(Value::String(out))
        }

        ast::Expr::Filter(filter) => {
            let name = &filter.name;
            let function = match resolve(stack, source, &var(&name.name), name.span)? {
                Value::Function(function) => function,
                value => {
                    return Err(Error::type_error(format!(
                        "expected function, found {}",
                        value.human()
                    ))
                    .with_span(source, name.span));
                }
            };
            let mut args = Vec::with_capacity(filter.args.len() + 1);
            args.push(eval(stack, source, &filter.receiver)?);
            for arg in &filter.args {
                args.push(eval(stack, source, arg)?);
            }
            function
                .call(&args)
                .map_err(|e| e.with_span(source, expr.span()))
        }
    }
}

fn resolve(stack: &ScopeStack<Value>, source: &str, symbol: &str, span: Span) -> Result<Value> {
    match stack.lookup(symbol) {
        Some((_, value)) => Ok(value),
        None => Err(Error::undefined(symbol).with_span(source, span)),
    }
}

/// Index the value with the given path.
fn lookup_path(source: &str, value: Value, path: &[ast::Key]) -> Result<Value> {
    if path.is_empty() {
        return Ok(value);
    }
    let v = path.iter().try_fold(&value, |v, p| lookup(source, v, p))?;
    Ok(v.clone())
}

/// Index into the value with the given path segment.
fn lookup<'a>(source: &str, value: &'a Value, key: &ast::Key) -> Result<&'a Value> {
    match (value, key) {
        (Value::List(list), ast::Key::List(i)) => list.get(i.value).ok_or_else(|| {
            Error::type_error(format!(
                "index out of bounds, the length is {}",
                list.len()
            ))
            .with_span(source, i.span)
        }),
        (Value::List(_), ast::Key::Map(ident)) => {
            Err(Error::type_error("cannot index list with string").with_span(source, ident.span))
        }
        (Value::Map(map), ast::Key::Map(ident)) => map.get(&ident.name).ok_or_else(|| {
            Error::type_error(format!("`{}` not found in map", ident.name))
                .with_span(source, ident.span)
        }),
        (Value::Map(_), ast::Key::List(i)) => {
            Err(Error::type_error("cannot index map with integer").with_span(source, i.span))
        }
        (value, key) => Err(Error::type_error(format!(
            "cannot index into {}",
            value.human()
        ))
        .with_span(source, key.span())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Function;
    use crate::ErrorKind;

    fn stack() -> ScopeStack<Value> {
        let mut stack = ScopeStack::new();
        stack.push(
            "$user",
            Value::from([
                ("name", Value::from("Ada")),
                ("langs", Value::from(vec!["en", "fr"])),
            ]),
        );
        stack.push(
            "$shout",
            Value::Function(Function::new("shout", |args: &[Value]| {
                let s = args[0].as_str().unwrap_or_default();
                Ok(Value::from(format!("{}{}", s.to_uppercase(), args.len())))
            })),
        );
        stack
    }

    #[test]
    fn eval_path() {
        let value = eval(&stack(), "", &ast::Expr::path("user", &["langs", "1"])).unwrap();
        assert_eq!(value, Value::from("fr"));
    }

    #[test]
    fn eval_path_errors() {
        let err = eval(&stack(), "", &ast::Expr::path("user", &["age"])).unwrap_err();
        assert_eq!(err.to_string(), "`age` not found in map");
        let err = eval(&stack(), "", &ast::Expr::path("user", &["langs", "5"])).unwrap_err();
        assert_eq!(err.to_string(), "index out of bounds, the length is 2");
        let err = eval(&stack(), "", &ast::Expr::path("user", &["name", "x"])).unwrap_err();
        assert_eq!(err.to_string(), "cannot index into string");
    }

    #[test]
    fn eval_not_and_concat() {
        let not = ast::Expr::Not(Box::new(ast::Expr::lit("")));
        assert_eq!(eval(&stack(), "", &not).unwrap(), Value::Bool(true));
        let concat = ast::Expr::Concat(vec![
            ast::Expr::path("user", &["name"]),
            ast::Expr::lit(" "),
            ast::Expr::lit(36),
        ]);
        assert_eq!(eval(&stack(), "", &concat).unwrap(), Value::from("Ada 36"));
    }

    #[test]
    fn eval_filter() {
        let expr = ast::Expr::filter(ast::Expr::lit("hi"), "shout", vec![ast::Expr::lit(1)]);
        assert_eq!(eval(&stack(), "", &expr).unwrap(), Value::from("HI2"));

        let expr = ast::Expr::filter(ast::Expr::lit("hi"), "user", vec![]);
        let err = eval(&stack(), "", &expr).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Type);
    }

    #[test]
    fn eval_undefined_has_span() {
        let expr = ast::Expr::Var(ast::Var {
            name: ast::Ident::with_span("who", 4..7),
            path: vec![],
        });
        let err = eval(&stack(), "hi, who?", &expr).unwrap_err();
        assert_eq!(err.to_string(), "undefined symbol `$who` between bytes 4 and 7");
    }
}
