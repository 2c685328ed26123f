// ABOUTME: Integration tests rendering templates that combine several helper groups
// ABOUTME: Exercises subexpressions, block helpers and input normalization through the engine

use serde_json::json;

mod common;
use common::{create_test_engine, render};

#[test]
fn test_docs_index_page() {
    let context = json!({
        "pages": [
            {"path": "docs/guide/intro.md", "title": "Intro", "order": 2},
            {"path": "docs/api/index.md", "title": "API", "order": 1},
            {"path": "docs/assets/logo.png", "title": "Logo", "order": 3}
        ]
    });

    let template = concat!(
        "{{#withSort pages \"order\"}}",
        "{{#if (isMatch path \"docs/**/*.md\")}}",
        "{{@index}}. {{title}} ({{relative \"docs\" (dirname path)}}/{{stem path}}.html);",
        "{{/if}}",
        "{{/withSort}}"
    );

    assert_eq!(
        render(template, &context),
        "0. API (api/index.html);1. Intro (guide/intro.html);"
    );
}

#[test]
fn test_object_and_array_helpers_compose() {
    let context = json!({
        "defaults": {"lang": "en", "theme": {"color": "blue"}},
        "page": {"theme": {"font": "serif"}},
        "tags": ["rust", "cli", "rust", "web"]
    });

    assert_eq!(
        render("{{{JSONstringify (merge defaults page)}}}", &context),
        r#"{"lang":"en","theme":{"color":"blue","font":"serif"}}"#
    );
    assert_eq!(
        render("{{{JSONstringify (extend defaults page)}}}", &context),
        r#"{"lang":"en","theme":{"font":"serif"}}"#
    );
    assert_eq!(
        render("{{join (sort (unique tags)) \" \"}}", &context),
        "cli rust web"
    );
    assert_eq!(
        render("{{get \"theme.color\" (merge defaults page)}}", &context),
        "blue"
    );
}

#[test]
fn test_url_helpers_compose() {
    let context = json!({"base": "https://example.com/docs/", "page": "guide/intro.html?v=2#top"});

    assert_eq!(
        render("{{stripQuerystring (urlResolve base page)}}", &context),
        "https://example.com/docs/guide/intro.html"
    );
    assert_eq!(
        render("{{get \"hostname\" (urlParse base)}}", &context),
        "example.com"
    );
    assert_eq!(
        render("{{encodeURIComponent (basename page)}}", &context),
        "intro.html%3Fv%3D2%23top"
    );
}

#[test]
fn test_missing_arguments_render_empty() {
    let engine = create_test_engine();
    let context = json!({});

    for template in [
        "{{first nope}}",
        "{{last nope}}",
        "{{join nope}}",
        "{{sort nope}}",
        "{{basename nope}}",
        "{{relative nope}}",
        "{{urlResolve nope}}",
        "{{urlParse nope}}",
        "{{get \"a\" nope}}",
        "{{#forEach nope}}x{{/forEach}}",
        "{{#forIn nope}}x{{/forIn}}",
        "{{#withGroup nope 2}}x{{/withGroup}}",
    ] {
        let result = engine.render_template(template, &context).unwrap();
        assert_eq!(result, "", "template {}", template);
    }

    assert_eq!(render("{{isMatch nope \"*\"}}", &context), "false");
    assert_eq!(render("{{length nope}}", &context), "0");
}

#[test]
fn test_nested_block_helpers_keep_their_own_variables() {
    let context = json!({
        "groups": {
            "fruit": ["apple", "pear"],
            "veg": ["leek"]
        }
    });

    let template = concat!(
        "{{#forIn groups}}",
        "{{@key}}:{{#forEach this}}{{@index}}{{this}}{{/forEach}};",
        "{{/forIn}}"
    );
    assert_eq!(render(template, &context), "fruit:0apple1pear;veg:0leek;");
}

#[test]
fn test_engine_is_shareable_across_threads() {
    let engine = create_test_engine();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let engine = engine.clone();
            std::thread::spawn(move || {
                engine
                    .render_template("{{itemAt items n}}", &json!({"items": [0, 1, 2, 3], "n": i}))
                    .unwrap()
            })
        })
        .collect();

    let results: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, vec!["0", "1", "2", "3"]);
}
