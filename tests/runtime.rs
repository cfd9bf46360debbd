use std::sync::Arc;

use hypertag::ast::{Block, Expr, Ident, ImportItems, Template};
use hypertag::{
    Body, Engine, Environment, ErrorKind, Hypertag, Map, Result, Runtime, Tag, Value, XHTML,
};

#[derive(Debug)]
struct Shout;

impl Tag for Shout {
    fn name(&self) -> &str {
        "shout"
    }

    fn expand(&self, body: Body<'_>, _: &[Value], _: &[(String, Value)]) -> Result<String> {
        Ok(format!("{}!", body.render()?.to_uppercase()))
    }
}

fn site() -> Runtime {
    let mut runtime = Runtime::new();
    runtime
        .add_module(
            "site",
            [
                ("$title", Value::from("Home")),
                ("$_secret", Value::from("hidden")),
                ("%shout", Value::Hypertag(Hypertag::from(Arc::new(Shout)))),
            ],
        )
        .unwrap();
    runtime
}

fn render(runtime: Runtime, blocks: Vec<Block>) -> Result<String> {
    let engine = Engine::with_runtime(runtime);
    let template = engine.compile(Template::new(blocks))?;
    template.render_from(&Map::new())
}

#[test]
fn runtime_import_named_symbols() {
    let result = render(
        site(),
        vec![
            Block::import(
                "site",
                ImportItems::Some(vec![Ident::new("$title"), Ident::new("%shout")]),
            ),
            Block::tag(
                "shout",
                vec![],
                vec![Block::parts(vec![Expr::var("title").into()])],
            ),
        ],
    )
    .unwrap();
    assert_eq!(result, "HOME!");
}

#[test]
fn runtime_import_all_skips_private_symbols() {
    let blocks = |name: &str| {
        vec![
            Block::import("site", ImportItems::All),
            Block::parts(vec![Expr::var(name).into()]),
        ]
    };
    assert_eq!(render(site(), blocks("title")).unwrap(), "Home");

    let err = render(site(), blocks("_secret")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UndefinedSymbol);
}

#[test]
fn runtime_import_private_symbol_by_name() {
    let result = render(
        site(),
        vec![
            Block::import("site", ImportItems::Some(vec![Ident::new("$_secret")])),
            Block::parts(vec![Expr::var("_secret").into()]),
        ],
    )
    .unwrap();
    assert_eq!(result, "hidden");
}

#[test]
fn runtime_import_unknown_path_fails_to_compile() {
    let err = Engine::new()
        .compile(Template::new(vec![Block::import(
            "nowhere",
            ImportItems::All,
        )]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Import);
    assert_eq!(err.to_string(), "unknown module path `nowhere`");
}

#[test]
fn runtime_import_unknown_symbol_fails_to_compile() {
    let err = Engine::with_runtime(site())
        .compile(Template::new(vec![Block::import(
            "site",
            ImportItems::Some(vec![Ident::new("$subtitle")]),
        )]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UndefinedSymbol);
}

#[test]
fn runtime_unimported_module_symbols_are_not_visible() {
    let err = Engine::with_runtime(site())
        .compile(Template::new(vec![Block::parts(vec![
            Expr::var("title").into(),
        ])]))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UndefinedSymbol);
}

#[test]
fn runtime_xhtml_registry() {
    let result = render(
        Runtime::with_registry(&XHTML),
        vec![
            Block::tag("br", vec![], vec![]).outline(""),
            Block::tag(
                "input",
                vec![hypertag::ast::Arg::named("checked", Expr::lit(true))],
                vec![],
            )
            .outline(""),
        ],
    )
    .unwrap();
    assert_eq!(result, "<br />\n<input checked=\"checked\" />");
}

#[test]
fn runtime_default_symbols() {
    let runtime = Runtime::new();
    let defaults = runtime.import_default().unwrap();
    assert!(defaults.contains_key("%p"));
    assert!(defaults.contains_key("%br"));
    assert!(defaults.contains_key("$join"));
    assert!(defaults.keys().all(|k| k.starts_with('%') || k.starts_with('$')));
}
