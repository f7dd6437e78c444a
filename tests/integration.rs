//! End-to-end exercises of the public API: walking, formatting, extracting,
//! editing, iterating, and pretty-printing a document together.

use pathjson::{
    jfmt, next_elem, next_key, prettify, printf, scanf, scanf_array_elem, setf, validate, walk,
    Arg, ArgCursor, Edit, ElementIter, GrowableBuffer, MemberIter, Out, Sink, VisitorEvent,
    WalkError, WalkerOptions,
};
use rstest::rstest;

fn render(fmt: &str, args: &[Arg<'_>]) -> String {
    let mut sink = GrowableBuffer::new();
    printf(&mut sink, fmt, args);
    sink.into_string().unwrap()
}

#[test]
fn walk_reports_a_full_visitor_trace_for_a_mixed_document() {
    let src = br#"{a:1,b:"two",c:[true,null,{d:3.5}]}"#;
    let mut trace: Vec<String> = Vec::new();
    let mut visitor = |e: VisitorEvent<'_>| {
        trace.push(format!("{}:{:?}", e.path, e.token.kind()));
    };
    let consumed = walk(src, WalkerOptions::default(), Some(&mut visitor)).unwrap();
    assert_eq!(consumed, src.len());
    assert!(trace.iter().any(|t| t.starts_with(".a:Number")));
    assert!(trace.iter().any(|t| t.starts_with(".c[2].d:Number")));
}

#[test]
fn validate_distinguishes_invalid_from_incomplete() {
    assert_eq!(validate(b"", WalkerOptions::default()).unwrap_err(), WalkError::Incomplete);
    assert_eq!(validate(b"}", WalkerOptions::default()).unwrap_err(), WalkError::Invalid);
    assert_eq!(validate(br#"{"a":1}"#, WalkerOptions::default()).unwrap(), 7);
}

#[rstest]
#[case("%d", &[Arg::Int(-7)], "-7")]
#[case("%05d", &[Arg::Int(42)], "00042")]
#[case("{a:%Q}", &[Arg::Quoted(Some("hi"))], r#"{"a":"hi"}"#)]
#[case("%B", &[Arg::Bool(false)], "false")]
fn printf_renders_expected_output(#[case] fmt: &str, #[case] args: &[Arg<'_>], #[case] expected: &str) {
    assert_eq!(render(fmt, args), expected);
}

#[test]
fn printf_nested_callback_consumes_the_shared_cursor() {
    let array_items = |sink: &mut dyn Sink, cur: &mut ArgCursor<'_>| {
        let mut written = sink.write(b"[");
        let mut first = true;
        while let Some(arg) = cur.next() {
            if !first {
                written += sink.write(b",");
            }
            first = false;
            written += printf(sink, "%d", std::slice::from_ref(arg));
        }
        written + sink.write(b"]")
    };
    let cb = Arg::Callback(&array_items);
    assert_eq!(
        render("{nums:%M}", &[cb, Arg::Int(1), Arg::Int(2), Arg::Int(3)]),
        r#"{"nums":[1,2,3]}"#
    );
}

#[test]
fn scanf_extracts_out_of_order_keys_by_path() {
    let mut count = 0i64;
    let mut name: Option<String> = None;
    let mut args = [Out::Int(&mut count), Out::Quoted(&mut name)];
    let matched = scanf(
        br#"{"name":"widget","count":4,"extra":true}"#,
        "{count:%d,name:%Q}",
        &mut args,
    );
    assert_eq!(matched, 2);
    assert_eq!(count, 4);
    assert_eq!(name.as_deref(), Some("widget"));
}

#[test]
fn scanf_array_elem_extracts_a_single_indexed_item() {
    let mut v = 0i64;
    let mut args = [Out::Int(&mut v)];
    assert_eq!(
        scanf_array_elem(br#"{"items":[10,20,30]}"#, ".items", 2, "%d", &mut args),
        1
    );
    assert_eq!(v, 30);
    assert_eq!(
        scanf_array_elem(br#"{"items":[10]}"#, ".items", 9, "%d", &mut args),
        -1
    );
}

#[test]
fn scanf_callback_conversion_receives_the_whole_value_for_manual_rescans() {
    let src = br#"{ a: 1234, b : true, "c": {x: [17, 78, -20]}, d: "hi%20there" }"#;
    let mut a = 0i64;
    let mut b = false;
    let mut d: Option<String> = None;
    let mut trace = String::new();
    let mut on_c = |raw: &[u8]| {
        for i in 0.. {
            let mut elem = 0i64;
            let mut elem_args = [Out::Int(&mut elem)];
            if scanf_array_elem(raw, ".x", i, "%d", &mut elem_args) <= 0 {
                break;
            }
            trace.push_str(&format!("{i}[{elem}] "));
        }
    };
    let mut args = [
        Out::Int(&mut a),
        Out::Bool(&mut b),
        Out::Callback(&mut on_c),
        Out::Quoted(&mut d),
    ];
    let matched = scanf(src, "{a: %d, b: %B, c: [%M], d: %Q}", &mut args);
    assert_eq!(matched, 4);
    assert_eq!((a, b, trace.as_str(), d.as_deref()), (1234, true, "0[17] 1[78] 2[-20] ", Some("hi%20there")));
}

#[test]
fn setf_replace_delete_and_push_compose_into_a_document_rewrite() {
    let doc = br#"{"name":"widget","tags":["a","b"],"count":1}"#;

    let mut sink = GrowableBuffer::new();
    let result = setf(doc, &mut sink, ".count", Edit::Replace("%d", &jfmt![2]));
    assert_eq!(result, 1);
    let after_replace = sink.into_bytes();

    let mut sink = GrowableBuffer::new();
    let result = setf(&after_replace, &mut sink, ".tags[]", Edit::Replace("%Q", &jfmt!["c"]));
    assert_eq!(result, 0);
    let after_push = sink.into_bytes();

    let mut sink = GrowableBuffer::new();
    let result = setf(&after_push, &mut sink, ".name", Edit::Delete);
    assert_eq!(result, 1);
    let final_doc = sink.into_string().unwrap();

    assert_eq!(final_doc, r#"{"tags":["a","b","c"],"count":2}"#);
    validate(final_doc.as_bytes(), WalkerOptions::default()).unwrap();
}

#[test]
fn setf_inserts_missing_nested_objects() {
    let mut sink = GrowableBuffer::new();
    let result = setf(b"{}", &mut sink, ".meta.owner", Edit::Replace("%Q", &jfmt!["jane"]));
    assert_eq!(result, 0);
    assert_eq!(sink.into_string().unwrap(), r#"{"meta":{"owner":"jane"}}"#);
}

#[test]
fn iterators_yield_direct_children_only() {
    let members: Vec<_> = MemberIter::new(br#"{"a":1,"b":[1,2],"c":{"d":3}}"#, "")
        .unwrap()
        .map(|(k, t)| (k.to_owned(), t.text().to_owned()))
        .collect();
    assert_eq!(members[0].0, "a");
    assert_eq!(members[1].0, "b");
    assert_eq!(members[2].0, "c");

    let mut it = ElementIter::new(b"[1,2,3]", "").unwrap();
    let mut elems = Vec::new();
    while let Some(t) = next_elem(&mut it) {
        elems.push(t.text().to_owned());
    }
    assert_eq!(elems, vec!["1", "2", "3"]);

    let mut members = MemberIter::new(br#"{"only":true}"#, "").unwrap();
    assert!(next_key(&mut members).is_some());
    assert!(next_key(&mut members).is_none());
}

#[test]
fn iterators_can_locate_a_nested_container_by_path() {
    let doc = br#"{"a":1,"b":{"x":10,"y":20},"c":[7,8,9]}"#;

    let members: Vec<_> = MemberIter::new(doc, ".b").unwrap().map(|(k, t)| (k.to_owned(), t.text().to_owned())).collect();
    assert_eq!(members, vec![("x".to_owned(), "10".to_owned()), ("y".to_owned(), "20".to_owned())]);

    let elems: Vec<_> = ElementIter::new(doc, ".c").unwrap().map(|t| t.text().to_owned()).collect();
    assert_eq!(elems, vec!["7", "8", "9"]);
}

#[test]
fn prettify_reformats_a_compact_document() {
    let mut sink = GrowableBuffer::new();
    prettify(br#"{"a":1,"b":[1,2]}"#, &mut sink).unwrap();
    assert_eq!(
        sink.into_string().unwrap(),
        "{\n  \"a\": 1,\n  \"b\": [\n    1,\n    2\n  ]\n}"
    );
}

#[quickcheck_macros::quickcheck]
fn printf_array_of_ints_is_always_valid_json(values: Vec<i64>) -> bool {
    let fmt = format!("[{}]", vec!["%d"; values.len()].join(","));
    let args: Vec<Arg<'_>> = values.iter().map(|v| Arg::Int(*v)).collect();
    let mut sink = GrowableBuffer::new();
    printf(&mut sink, &fmt, &args);
    validate(&sink.into_bytes(), WalkerOptions::default()).is_ok()
}
