#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, u8, bool)| {
    let (text, width, tabs) = data;
    let indent = if tabs { "\t" } else { " " }.repeat(usize::from(width % 8) + 1);

    let added = hypertag::add_indent(text, &indent);
    assert_eq!(hypertag::del_indent(&added, &indent), text);

    let common = hypertag::get_indent(text);
    for line in text.split('\n').filter(|l| !l.is_empty()) {
        assert!(line.starts_with(common));
    }
});
