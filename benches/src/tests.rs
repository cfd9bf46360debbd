use hypertag::Engine;

use crate::context::{Context, User};

#[test]
fn users() {
    let ctx = Context {
        title: "Users".into(),
        users: vec![
            User {
                name: "ada".into(),
                age: 36,
                is_disabled: false,
            },
            User {
                name: "bob".into(),
                age: 40,
                is_disabled: true,
            },
        ],
    };
    let engine = Engine::new();
    let result = engine.compile(crate::users()).unwrap().render(&ctx).unwrap();
    assert_eq!(
        result,
        "<h1>Users</h1>
<table>
    <tr>
        <td>ada</td>
        <td>36</td>
    </tr>
    <tr>
        <td>bob</td>
        <td>40</td>
        <td>disabled</td>
    </tr>
</table>"
    );
}

#[test]
fn nested() {
    let engine = Engine::new();
    let result = engine
        .compile(crate::nested(2))
        .unwrap()
        .render_from(&Default::default())
        .unwrap();
    assert_eq!(result, "<div>\n    <div>\n        leaf\n    </div>\n</div>");
}
