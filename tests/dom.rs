use std::sync::Arc;

use hypertag::{
    Body, Content, Document, Element, ElementOptions, ErrorKind, Indent, Node, Result, Selector,
    Sequence, Tag, Text, Value, HTML, XHTML,
};
use proptest::prelude::*;

fn text(s: &str) -> Node {
    Node::Text(Text::new(s))
}

fn html(name: &str) -> Arc<dyn Tag> {
    HTML.get(name).unwrap().clone()
}

fn element(name: &str, body: Vec<Node>, kwattrs: Vec<(&str, Value)>) -> Node {
    let options = ElementOptions {
        tag: Some(html(name)),
        kwattrs: kwattrs
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v))
            .collect(),
        ..Default::default()
    };
    Element::new(Sequence::from_nodes(body), options)
        .unwrap()
        .into()
}

#[test]
fn dom_inline_element_inside_outline_group() {
    let span = element("span", vec![text("a")], vec![]);
    let group = Element::group(
        Sequence::from_nodes(vec![span, text("\nb\n")]),
        true,
        Some(Indent::Relative("  ".into())),
    )
    .unwrap();
    assert_eq!(group.render().unwrap(), "\n  <span>a</span>\n  b\n");
}

#[test]
fn dom_inline_element_inside_outline_div() {
    let span = element("span", vec![text("a")], vec![]);
    let options = ElementOptions {
        tag: Some(html("div")),
        outline: true,
        indent: Some(Indent::Relative("  ".into())),
        ..Default::default()
    };
    let div = Element::new(Sequence::from_nodes(vec![span, text("\nb\n")]), options).unwrap();
    assert_eq!(div.render().unwrap(), "\n  <div><span>a</span>\n  b\n  </div>");
}

#[test]
fn dom_nested_outline_elements() {
    let li = |s: &str| {
        let options = ElementOptions {
            tag: Some(html("li")),
            outline: true,
            indent: Some(Indent::Absolute("\n  ".into())),
            ..Default::default()
        };
        Node::from(Element::new(Sequence::from_nodes(vec![text(s)]), options).unwrap())
    };
    let options = ElementOptions {
        tag: Some(html("ul")),
        outline: true,
        indent: Some(Indent::Absolute("\n".into())),
        ..Default::default()
    };
    let ul = Element::new(Sequence::from_nodes(vec![li("a"), li("b")]), options).unwrap();
    let doc = Document::new(Sequence::from_nodes(vec![ul.into()])).unwrap();
    assert_eq!(doc.render().unwrap(), "<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>");
}

#[test]
fn dom_void_element_rejects_body() {
    let options = ElementOptions {
        tag: Some(html("br")),
        ..Default::default()
    };
    let err = Element::new(Sequence::from_nodes(vec![text("x")]), options.clone()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::VoidBody);
    assert_eq!(err.to_string(), "void tag `br` must not have a body");

    let br = Element::new(Sequence::default(), options).unwrap();
    assert_eq!(br.render().unwrap(), "<br>");
}

#[test]
fn dom_sequence_flattens_content() {
    let nested = Content::List(vec![
        Content::Node(text("a")),
        Content::None,
        Content::List(vec![Content::Node(text("b")), Content::Value(Value::None)]),
        Content::Sequence(Sequence::from_nodes(vec![text("c")])),
    ]);
    let seq = Sequence::new([nested]).unwrap();
    assert_eq!(seq.len(), 3);
    assert_eq!(seq.render().unwrap(), "abc");
}

#[test]
fn dom_sequence_rejects_scalars() {
    let err = Sequence::new([Value::from(1)]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StructuralType);
    assert_eq!(err.to_string(), "expected a node, found integer");
}

#[test]
fn dom_select_by_tag_class_and_attr() {
    let list = element(
        "ul",
        vec![
            element("li", vec![text("1")], vec![("class", Value::from("item on"))]),
            element("li", vec![text("2")], vec![("class", Value::from("item"))]),
            element(
                "li",
                vec![text("3")],
                vec![("class", Value::from(vec!["on"])), ("id", Value::from("last"))],
            ),
        ],
        vec![],
    );
    let doc = Document::new(Sequence::from_nodes(vec![list])).unwrap();

    assert_eq!(doc.select(&Selector::new().tag("li")).len(), 3);
    let on = doc.select(&Selector::new().tag("li").class("on"));
    assert_eq!(
        on.render().unwrap(),
        "<li class=\"item on\">1</li><li class=\"on\" id=\"last\">3</li>"
    );
    assert_eq!(doc.select(&Selector::new().id("last")).len(), 1);
    assert_eq!(
        doc.select(&Selector::new().attr("class", "item")).len(),
        1
    );
    assert!(doc.select(&Selector::new().tag("p")).is_empty());
}

#[derive(Debug)]
struct Count;

impl Tag for Count {
    fn name(&self) -> &str {
        "count"
    }

    fn is_textual(&self) -> bool {
        false
    }

    fn expand(&self, body: Body<'_>, _: &[Value], _: &[(String, Value)]) -> Result<String> {
        match body {
            Body::Nodes(seq) => Ok(format!("{} nodes", seq.len())),
            Body::Text(_) => panic!("expected nodes"),
        }
    }
}

#[test]
fn dom_non_textual_tag_receives_nodes() {
    let options = ElementOptions {
        tag: Some(Arc::new(Count)),
        ..Default::default()
    };
    let element = Element::new(Sequence::from_nodes(vec![text("a"), text("b")]), options).unwrap();
    assert_eq!(element.render().unwrap(), "2 nodes");
}

fn content() -> impl Strategy<Value = Content> {
    let leaf = prop_oneof![
        4 => "[a-z]{1,3}".prop_map(|s| Content::Node(text(&s))),
        1 => Just(Content::None),
        1 => Just(Content::Value(Value::None)),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner, 0..4).prop_map(Content::List),
            prop::collection::vec("[a-z]{1,3}", 0..3).prop_map(|texts| {
                let nodes = texts.iter().map(|s| text(s)).collect();
                Content::Sequence(Sequence::from_nodes(nodes))
            }),
        ]
    })
}

/// The text leaves of `content` in document order.
fn leaves(content: &Content, out: &mut Vec<String>) {
    match content {
        Content::Node(Node::Text(t)) => out.push(t.as_str().to_owned()),
        Content::List(items) => items.iter().for_each(|item| leaves(item, out)),
        Content::Sequence(seq) => {
            for node in seq.iter() {
                if let Node::Text(t) = node {
                    out.push(t.as_str().to_owned());
                }
            }
        }
        _ => {}
    }
}

fn void_tags() -> Vec<Arc<dyn Tag>> {
    HTML.iter()
        .chain(XHTML.iter())
        .filter(|(_, tag)| tag.is_void())
        .map(|(_, tag)| tag.clone())
        .collect()
}

proptest! {
    #[test]
    fn dom_sequence_flattening_keeps_leaf_order(tree in content()) {
        let mut expected = Vec::new();
        leaves(&tree, &mut expected);

        let nested = Sequence::new([tree]).unwrap();
        let flat = Sequence::new(expected.iter().map(|s| Content::Node(text(s)))).unwrap();
        prop_assert_eq!(nested.len(), expected.len());
        prop_assert_eq!(nested.render().unwrap(), flat.render().unwrap());
        prop_assert_eq!(nested.render().unwrap(), expected.concat());
    }

    #[test]
    fn dom_void_tags_reject_any_body(
        tag in prop::sample::select(void_tags()),
        body in prop::collection::vec("[a-z<> ]{1,6}", 1..4),
    ) {
        let options = ElementOptions {
            tag: Some(tag.clone()),
            ..Default::default()
        };
        let nodes = body.iter().map(|s| text(s)).collect();
        let err = Element::new(Sequence::from_nodes(nodes), options).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::VoidBody);

        let err = tag.expand(Body::Text(&body.concat()), &[], &[]).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::VoidBody);
    }
}
