// ABOUTME: Object helpers for merging, querying and iterating JSON objects
// ABOUTME: Property iteration exposes @key and hash arguments to the block through a context frame

use handlebars::{Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use super::block::{render_in_block, render_inverse, BlockOrValue, BlockScope, ValueHelper};
use super::json::{arg, as_integer, hash_object, lookup, str_arg, to_text};
use super::Registrar;
use crate::frame::Frame;

static NULL: JsonValue = JsonValue::Null;

fn objects<'a>(h: &'a Helper<'_, '_>) -> impl Iterator<Item = &'a JsonValue> {
    h.params().iter().map(|p| p.value()).filter(|v| v.is_object())
}

/// Shallow merge of every object argument into a new object
pub fn extend(h: &Helper<'_, '_>) -> JsonValue {
    let target = JsonValue::Object(Map::new());
    Frame::with_overlays(&target, objects(h))
        .map(Frame::into_value)
        .unwrap_or_default()
}

fn deep_merge(target: &mut Map<String, JsonValue>, source: &Map<String, JsonValue>) {
    for (key, value) in source {
        if let (Some(JsonValue::Object(existing)), JsonValue::Object(incoming)) =
            (target.get_mut(key), value)
        {
            deep_merge(existing, incoming);
            continue;
        }
        target.insert(key.clone(), value.clone());
    }
}

/// Recursive merge of every object argument into a new object
pub fn merge(h: &Helper<'_, '_>) -> JsonValue {
    let mut merged = Map::new();
    for object in objects(h).filter_map(|v| v.as_object()) {
        deep_merge(&mut merged, object);
    }
    JsonValue::Object(merged)
}

fn path_arg(h: &Helper<'_, '_>, idx: usize) -> Option<String> {
    match arg(h, idx)? {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(_) => arg(h, idx).map(to_text),
        _ => None,
    }
}

/// Value at a dot path inside the second argument
pub fn get(h: &Helper<'_, '_>) -> JsonValue {
    match (path_arg(h, 0), arg(h, 1)) {
        (Some(path), Some(target)) => lookup(target, &path).cloned().unwrap_or(JsonValue::Null),
        _ => JsonValue::Null,
    }
}

/// `{last_segment: value}` for the value at a dot path
pub fn get_object(h: &Helper<'_, '_>) -> JsonValue {
    let mut picked = Map::new();
    if let (Some(path), Some(target)) = (path_arg(h, 0), arg(h, 1)) {
        if let Some(value) = lookup(target, &path) {
            let key = path.rsplit('.').next().unwrap_or(&path).to_string();
            picked.insert(key, value.clone());
        }
    }
    JsonValue::Object(picked)
}

pub fn has_own(h: &Helper<'_, '_>) -> JsonValue {
    let found = match (arg(h, 0), path_arg(h, 1)) {
        (Some(JsonValue::Object(map)), Some(key)) => map.contains_key(&key),
        _ => false,
    };
    JsonValue::Bool(found)
}

pub fn is_object(h: &Helper<'_, '_>) -> JsonValue {
    JsonValue::Bool(matches!(arg(h, 0), Some(JsonValue::Object(_))))
}

/// Join string and number arguments into a dot path
pub fn to_path(h: &Helper<'_, '_>) -> JsonValue {
    let segments: Vec<String> = h
        .params()
        .iter()
        .map(|p| p.value())
        .filter(|v| v.is_string() || v.is_number())
        .map(to_text)
        .collect();
    JsonValue::String(segments.join("."))
}

fn stringify(value: &JsonValue, indent: usize) -> Result<String, serde_json::Error> {
    if indent == 0 {
        return serde_json::to_string(value);
    }
    let pad = " ".repeat(indent);
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(pad.as_bytes());
    let mut serializer = Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// JSON text of the first argument, indented when a width is given
pub fn json_stringify(h: &Helper<'_, '_>) -> JsonValue {
    let value = h.param(0).map(|p| p.value()).unwrap_or(&NULL);
    let indent = arg(h, 1)
        .and_then(as_integer)
        .map(|n| n.clamp(0, 10) as usize)
        .unwrap_or(0);
    match stringify(value, indent) {
        Ok(text) => JsonValue::String(text),
        Err(e) => {
            debug!("JSONstringify failed: {}", e);
            JsonValue::String(String::new())
        }
    }
}

pub fn json_parse(h: &Helper<'_, '_>) -> JsonValue {
    str_arg(h, 0)
        .and_then(|text| serde_json::from_str(text).ok())
        .unwrap_or(JsonValue::Null)
}

/// Renders the block once per property with `@key`, `@index` and the
/// hash arguments as private variables
#[derive(Clone, Copy)]
pub struct ForInHelper;

impl HelperDef for ForInHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let (template, map) = match (h.template(), arg(h, 0)) {
            (Some(t), Some(JsonValue::Object(map))) => (t, map),
            _ => return render_inverse(h, r, ctx, rc, out),
        };

        let extras = hash_object(h);
        let mut frame = Frame::new(&extras)?;
        for (index, (key, value)) in map.iter().enumerate() {
            frame.insert("key", JsonValue::String(key.clone()));
            frame.insert("index", JsonValue::from(index));
            render_in_block(template, r, ctx, rc, out, value.clone(), Some(&frame))?;
        }
        Ok(())
    }
}

pub(crate) fn register(registrar: &mut Registrar<'_, '_>) {
    registrar.add("extend", ValueHelper(extend));
    registrar.add("merge", ValueHelper(merge));
    registrar.add("getObject", ValueHelper(get_object));
    registrar.add("hasOwn", ValueHelper(has_own));
    registrar.add("isObject", ValueHelper(is_object));
    registrar.add("toPath", ValueHelper(to_path));
    registrar.add("JSONstringify", ValueHelper(json_stringify));
    registrar.add("JSONparse", ValueHelper(json_parse));
    registrar.add(
        "get",
        BlockOrValue {
            value: get,
            scope: BlockScope::Value,
        },
    );
    registrar.add(
        "pick",
        BlockOrValue {
            value: get_object,
            scope: BlockScope::Value,
        },
    );
    registrar.add("forIn", ForInHelper);
    registrar.add("forOwn", ForInHelper);
}
