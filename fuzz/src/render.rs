#![no_main]

use arbitrary::Arbitrary;
use hypertag::ast;
use libfuzzer_sys::fuzz_target;

const TAGS: &[&str] = &["div", "p", "br", "span", "box", "row"];

#[derive(Debug, Arbitrary)]
enum Block {
    Text(String, Layout),
    Tag(u8, Vec<Attr>, Vec<Block>, Layout),
    Embed(u8, Layout),
    Define(u8, bool, Vec<Block>),
    Assign(u8, Literal),
    If(u8, Vec<Block>, Option<Vec<Block>>),
    For(u8, Vec<Literal>, Vec<Block>),
}

#[derive(Debug, Arbitrary)]
enum Layout {
    Inline,
    Outline(u8),
}

#[derive(Debug, Arbitrary)]
enum Attr {
    Positional(Literal),
    Named(u8, Literal),
}

#[derive(Debug, Arbitrary)]
enum Literal {
    None,
    Bool(bool),
    Integer(i64),
    String(String),
}

fn name(i: u8) -> &'static str {
    TAGS[usize::from(i) % TAGS.len()]
}

fn var(i: u8) -> String {
    format!("v{}", i % 4)
}

fn layout(block: ast::Block, layout: Layout) -> ast::Block {
    match layout {
        Layout::Inline => block,
        Layout::Outline(n) => block.outline(&" ".repeat(usize::from(n % 4))),
    }
}

fn literal(lit: Literal) -> ast::Expr {
    match lit {
        Literal::None => ast::Expr::lit(()),
        Literal::Bool(b) => ast::Expr::lit(b),
        Literal::Integer(i) => ast::Expr::lit(i),
        Literal::String(s) => ast::Expr::lit(s),
    }
}

fn blocks(blocks: Vec<Block>) -> Vec<ast::Block> {
    blocks.into_iter().map(block).collect()
}

fn block(block: Block) -> ast::Block {
    match block {
        Block::Text(text, l) => layout(ast::Block::text(text), l),
        Block::Tag(i, attrs, body, l) => {
            let args = attrs
                .into_iter()
                .map(|attr| match attr {
                    Attr::Positional(lit) => ast::Arg::positional(literal(lit)),
                    Attr::Named(i, lit) => ast::Arg::named(&var(i), literal(lit)),
                })
                .collect();
            layout(ast::Block::tag(name(i), args, self::blocks(body)), l)
        }
        Block::Embed(i, l) => layout(ast::Block::embed(ast::Expr::var(&var(i))), l),
        Block::Define(i, body_param, body) => ast::Block::hypertag(ast::HypertagDef::new(
            name(i),
            vec![],
            body_param.then_some("v0"),
            self::blocks(body),
        )),
        Block::Assign(i, lit) => ast::Block::assign(&var(i), literal(lit)),
        Block::If(i, then_branch, else_branch) => ast::Block::if_else(
            ast::Expr::var(&var(i)),
            self::blocks(then_branch),
            else_branch.map(self::blocks),
        ),
        Block::For(i, items, body) => ast::Block::for_loop(
            &var(i),
            ast::Expr::List(items.into_iter().map(literal).collect()),
            self::blocks(body),
        ),
    }
}

fuzz_target!(|data: Vec<Block>| {
    let engine = hypertag::Engine::new();
    let template = match engine.compile(ast::Template::new(blocks(data))) {
        Ok(template) => template,
        Err(_) => return,
    };
    let _ = template.render_from(&Default::default());
});
