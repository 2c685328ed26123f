// ABOUTME: Integration tests for context frames built from parent objects and overlays
// ABOUTME: Covers the public frame API and frames driving custom block helpers

use handlebars::{Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext};
use serde_json::{json, Value as JsonValue};

use hbs_helpers::helpers::render_in_block;
use hbs_helpers::{create_frame, Frame, FrameError, HelperEngine};

mod common;
use common::render;

#[test]
fn test_frame_has_exactly_source_keys() {
    let source = json!({"title": "Home", "draft": false, "tags": ["a", "b"]});
    let frame = Frame::new(&source).unwrap();

    assert_eq!(frame.len(), 3);
    assert_eq!(&JsonValue::Object(frame.data().clone()), &source);
    assert!(std::ptr::eq(frame.parent(), &source));
}

#[test]
fn test_last_overlay_defining_a_key_wins() {
    let source = json!({"k": "source", "only_source": 1});
    let o1 = json!({"k": "o1", "only_o1": 1});
    let o2 = json!({"k": "o2"});
    let o3 = json!({"other": true});

    let frame = create_frame(&source, [&o1, &o2, &o3]).unwrap();

    assert_eq!(frame.get("k"), Some(&json!("o2")));
    assert_eq!(frame.get("only_source"), Some(&json!(1)));
    assert_eq!(frame.get("only_o1"), Some(&json!(1)));
    assert_eq!(frame.get("other"), Some(&json!(true)));
}

#[test]
fn test_overlay_example() {
    let source = json!({"a": 1, "b": 2});
    let frame = create_frame(&source, [&json!({"b": 3, "c": 4})]).unwrap();

    assert_eq!(frame.clone().into_value(), json!({"a": 1, "b": 3, "c": 4}));
    assert_eq!(frame.parent(), &json!({"a": 1, "b": 2}));
}

#[test]
fn test_extend_chain_example() {
    let source = json!({"x": "a"});
    let mut frame = Frame::new(&source).unwrap();
    frame.extend(&json!({"y": "b"})).extend(&json!({"x": "c"}));

    assert_eq!(frame.into_data(), json!({"x": "c", "y": "b"}).as_object().unwrap().clone());
}

#[test]
fn test_falsy_overlays_are_empty() {
    let source = json!({"a": 1});
    let overlays = [json!(null), json!(false), json!(0), json!(""), json!({})];
    let frame = create_frame(&source, overlays.iter()).unwrap();

    assert_eq!(frame.keys().cloned().collect::<Vec<_>>(), vec!["a".to_string()]);
}

#[test]
fn test_non_object_sources_fail() {
    let cases = [
        (json!(5), "number"),
        (json!("x"), "string"),
        (json!(["a"]), "array"),
        (JsonValue::Null, "null"),
    ];
    for (source, kind) in cases {
        let err = Frame::new(&source).unwrap_err();
        assert_eq!(err, FrameError::InvalidArgument(kind));
        assert!(err.to_string().contains("plain object"));
    }
}

#[test]
fn test_frame_mutation_is_isolated() {
    let source = json!({"list": [1, 2], "name": "x"});
    let overlay = json!({"name": "y"});
    let mut frame = create_frame(&source, [&overlay]).unwrap();

    frame.insert("list", json!([]));
    frame.extend(&json!({"name": "z"}));

    assert_eq!(source, json!({"list": [1, 2], "name": "x"}));
    assert_eq!(overlay, json!({"name": "y"}));
    assert!(frame.is_child_of(&source));
}

/// Renders its block with the first argument as `this`, and its keys plus
/// a `label` as private variables.
struct LabelledHelper;

impl HelperDef for LabelledHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let template = match h.template() {
            Some(t) => t,
            None => return Ok(()),
        };
        let source = h.param(0).map(|p| p.value().clone()).unwrap_or(JsonValue::Null);
        let mut frame = Frame::new(&source)?;
        frame.insert("label", json!("labelled"));
        render_in_block(template, r, ctx, rc, out, source.clone(), Some(&frame))
    }
}

#[test]
fn test_custom_block_helper_uses_frame() {
    let mut engine = HelperEngine::new().unwrap();
    engine.register_helper("labelled", LabelledHelper).unwrap();

    let context = json!({"page": {"title": "Intro"}});
    let result = engine
        .render_template("{{#labelled page}}{{@label}}: {{title}} {{@title}}{{/labelled}}", &context)
        .unwrap();
    assert_eq!(result, "labelled: Intro Intro");

    let err = engine
        .render_template("{{#labelled page.title}}x{{/labelled}}", &context)
        .unwrap_err();
    assert!(err.to_string().contains("Invalid argument"));
}

#[test]
fn test_builtin_block_helpers_expose_frames() {
    let data = json!({"items": ["a", "b"], "obj": {"x": 1, "y": 2}});
    assert_eq!(
        render("{{#forEach items prefix=\"-\"}}{{@prefix}}{{this}}{{@index}}{{/forEach}}", &data),
        "-a0-b1"
    );
    assert_eq!(
        render("{{#forIn obj}}{{@key}}={{this}}@{{@index}};{{/forIn}}", &data),
        "x=1@0;y=2@1;"
    );
}
