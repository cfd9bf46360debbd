//! Templates and contexts shared by the benchmarks.

pub mod context;
#[cfg(test)]
mod tests;

use hypertag::ast::{Arg, Block, Expr, HypertagDef, Param, Template};

/// A page listing users in a table, one row per user.
///
/// ```text
/// context title, users
/// %row user
///     tr
///         td | $user.name
///         td | $user.age
///         if user.is_disabled
///             td | disabled
/// h1 | $title
/// table
///     for user in users
///         row user
/// ```
pub fn users() -> Template {
    let td = |body: Block| Block::tag("td", vec![], vec![body]).outline("    ");
    let row = HypertagDef::new(
        "row",
        vec![Param::new("user")],
        None,
        vec![Block::tag(
            "tr",
            vec![],
            vec![
                td(Block::parts(vec![Expr::path("user", &["name"]).into()])),
                td(Block::parts(vec![Expr::path("user", &["age"]).into()])),
                Block::if_else(
                    Expr::path("user", &["is_disabled"]),
                    vec![td(Block::text("disabled"))],
                    None,
                ),
            ],
        )
        .outline("")],
    );
    Template::new(vec![
        Block::context(&["title", "users"]),
        Block::hypertag(row),
        Block::tag("h1", vec![], vec![Block::parts(vec![Expr::var("title").into()])])
            .outline(""),
        Block::tag(
            "table",
            vec![],
            vec![Block::for_loop(
                "user",
                Expr::var("users"),
                vec![Block::tag("row", vec![Arg::positional(Expr::var("user"))], vec![])
                    .outline("    ")],
            )],
        )
        .outline(""),
    ])
}

/// `n` hypertags, each wrapping the body of the next one in a `div`.
pub fn nested(n: usize) -> Template {
    let mut blocks = Vec::new();
    let mut prev: Option<String> = None;
    for i in 0..n {
        let name = format!("level{i}");
        let inner = match &prev {
            Some(prev) => Block::tag(prev, vec![], vec![Block::embed(Expr::var("body")).outline("    ")]),
            None => Block::embed(Expr::var("body")),
        };
        blocks.push(Block::hypertag(HypertagDef::new(
            &name,
            vec![],
            Some("body"),
            vec![Block::tag("div", vec![], vec![inner.outline("    ")]).outline("")],
        )));
        prev = Some(name);
    }
    if let Some(last) = prev {
        blocks.push(Block::tag(&last, vec![], vec![Block::text("leaf").outline("    ")]).outline(""));
    }
    Template::new(blocks)
}
