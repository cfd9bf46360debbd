use hypertag::{quote_attr, Body, ErrorKind, MarkupTag, Mode, Registry, Tag, Value, HTML, XHTML};

fn kw(attrs: &[(&str, Value)]) -> Vec<(String, Value)> {
    attrs
        .iter()
        .map(|(k, v)| ((*k).to_owned(), v.clone()))
        .collect()
}

#[test]
fn markup_quote_attr() {
    assert_eq!(quote_attr("plain"), "\"plain\"");
    assert_eq!(quote_attr("it's"), "\"it's\"");
    assert_eq!(quote_attr("say \"hi\""), "'say \"hi\"'");
    assert_eq!(quote_attr("it's \"x\" & y"), "\"it's &quot;x&quot; &amp; y\"");
}

#[test]
fn markup_positional_attributes() {
    let p = MarkupTag::new("p", false, Mode::Html);
    let attrs = [Value::from("hidden"), Value::None, Value::Bool(false)];
    assert_eq!(
        p.expand(Body::Text("x"), &attrs, &[]).unwrap(),
        "<p hidden>x</p>"
    );
}

#[test]
fn markup_positional_true_is_rejected() {
    let p = MarkupTag::new("p", false, Mode::Html);
    let attrs = [Value::Bool(true), Value::from("hidden")];
    let err = p.expand(Body::Text("x"), &attrs, &[]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
    assert_eq!(err.to_string(), "positional attribute of `p` must not be `true`");
}

#[test]
fn markup_html_and_xhtml_conventions() {
    let attrs = kw(&[
        ("type", Value::from("checkbox")),
        ("checked", Value::Bool(true)),
        ("required", Value::None),
    ]);
    let html = HTML.get("input").unwrap();
    let xhtml = XHTML.get("input").unwrap();
    assert_eq!(
        html.expand(Body::Text(""), &[], &attrs).unwrap(),
        "<input type=\"checkbox\" checked>"
    );
    assert_eq!(
        xhtml.expand(Body::Text(""), &[], &attrs).unwrap(),
        "<input type=\"checkbox\" checked=\"checked\" />"
    );
}

#[test]
fn markup_every_void_tag_rejects_body() {
    for (name, tag) in HTML.iter().filter(|(_, tag)| tag.is_void()) {
        let err = tag.expand(Body::Text("x"), &[], &[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::VoidBody, "{name}");
    }
}

#[test]
fn markup_attribute_must_be_scalar() {
    let div = MarkupTag::new("div", false, Mode::Html);
    let attrs = kw(&[("data", Value::from([("k", "v")]))]);
    let err = div.expand(Body::Text(""), &[], &attrs).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Type);
}

#[test]
fn markup_custom_registry() {
    let mut registry = Registry::default();
    assert!(registry.is_empty());
    registry.insert(std::sync::Arc::new(MarkupTag::new("note", false, Mode::Html)));
    assert_eq!(registry.len(), 1);
    let note = registry.get("NOTE").unwrap();
    assert_eq!(note.expand(Body::Text("n"), &[], &[]).unwrap(), "<note>n</note>");
    assert!(!HTML.is_empty());
}
