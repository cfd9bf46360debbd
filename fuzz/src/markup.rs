#![no_main]

use hypertag::{quote_attr, Body, MarkupTag, Mode, Tag, Value};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, Vec<(String, &str)>, bool)| {
    let (body, attrs, xhtml) = data;

    for (_, value) in &attrs {
        let quoted = quote_attr(value);
        let quote = quoted.chars().next().unwrap();
        assert!(quote == '"' || quote == '\'');
        assert!(quoted.ends_with(quote));
        assert!(!quoted[1..quoted.len() - 1].contains(quote));
    }

    let mode = if xhtml { Mode::Xhtml } else { Mode::Html };
    let kwattrs: Vec<_> = attrs
        .into_iter()
        .map(|(name, value)| (name, Value::from(value)))
        .collect();
    let div = MarkupTag::new("div", false, mode);
    let out = div.expand(Body::Text(body), &[], &kwattrs).unwrap();
    assert!(out.starts_with("<div") && out.ends_with("</div>"));

    let br = MarkupTag::new("br", true, mode);
    assert_eq!(br.expand(Body::Text(body), &[], &kwattrs).is_err(), !body.is_empty());
});
