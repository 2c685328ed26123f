// ABOUTME: Array helpers for filtering, slicing, sorting and iterating collections
// ABOUTME: Block helpers expose per-item private variables to nested blocks through context frames

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, Renderable,
};
use serde_json::{json, Value as JsonValue};
use std::cmp::Ordering;
use tracing::trace;

use super::block::{
    render_each, render_in_block, render_inverse, BlockOrValue, BlockScope, ValueHelper,
};
use super::json::{
    arg, as_integer, compare_values, dedup, hash_arg, hash_flag, is_truthy, lookup,
    parse_integer, slice_bounds, slice_str, str_arg, to_text,
};
use super::Registrar;
use crate::frame::Frame;

static EMPTY: JsonValue = JsonValue::Null;

fn empty_string() -> JsonValue {
    JsonValue::String(String::new())
}

/// Items of an array, or characters of a string, after index `n`
pub fn after(h: &Helper<'_, '_>) -> JsonValue {
    let n = arg(h, 1).and_then(parse_integer).unwrap_or(0);
    match arg(h, 0) {
        Some(JsonValue::Array(items)) => JsonValue::Array(items[slice_bounds(items.len(), n, None)].to_vec()),
        Some(JsonValue::String(s)) => JsonValue::String(slice_str(s, n, None)),
        _ => empty_string(),
    }
}

/// Collect every positional argument into an array
pub fn to_array(h: &Helper<'_, '_>) -> JsonValue {
    JsonValue::Array(h.params().iter().map(|p| p.value().clone()).collect())
}

/// Items equal to the given value, or whose `property` equals it
pub fn filter(h: &Helper<'_, '_>) -> JsonValue {
    let items = match arg(h, 0) {
        Some(JsonValue::Array(items)) => items,
        _ => return empty_string(),
    };
    let wanted = h.param(1).map(|p| p.value()).unwrap_or(&EMPTY);

    let matched = match hash_arg(h, "property").and_then(|v| v.as_str()) {
        Some(property) => items
            .iter()
            .filter(|item| lookup(item, property).unwrap_or(&EMPTY) == wanted)
            .cloned()
            .collect(),
        None => items.iter().filter(|item| *item == wanted).cloned().collect(),
    };
    JsonValue::Array(matched)
}

/// First item, or the first `n` items
pub fn first(h: &Helper<'_, '_>) -> JsonValue {
    let n = arg(h, 1).and_then(parse_integer);
    match (arg(h, 0), n) {
        (None, _) => empty_string(),
        (Some(JsonValue::Array(items)), None) => items.first().cloned().unwrap_or(JsonValue::Null),
        (Some(JsonValue::Array(items)), Some(n)) => {
            JsonValue::Array(items[slice_bounds(items.len(), 0, Some(n))].to_vec())
        }
        (Some(JsonValue::String(s)), None) => s
            .chars()
            .next()
            .map(|c| JsonValue::String(c.to_string()))
            .unwrap_or(JsonValue::Null),
        (Some(JsonValue::String(s)), Some(n)) => JsonValue::String(slice_str(s, 0, Some(n))),
        (Some(_), _) => JsonValue::Null,
    }
}

/// Last item, or the last `n` items
pub fn last(h: &Helper<'_, '_>) -> JsonValue {
    let start = arg(h, 1).and_then(parse_integer).map(|n| -n.abs());
    match (arg(h, 0), start) {
        (Some(JsonValue::Array(items)), None) => items.last().cloned().unwrap_or(JsonValue::Null),
        (Some(JsonValue::Array(items)), Some(start)) => {
            JsonValue::Array(items[slice_bounds(items.len(), start, None)].to_vec())
        }
        (Some(JsonValue::String(s)), None) => s
            .chars()
            .last()
            .map(|c| JsonValue::String(c.to_string()))
            .unwrap_or(JsonValue::Null),
        (Some(JsonValue::String(s)), Some(start)) => JsonValue::String(slice_str(s, start, None)),
        _ => empty_string(),
    }
}

/// Item at an index; negative indexes count from the end
pub fn item_at(h: &Helper<'_, '_>) -> JsonValue {
    let items = match arg(h, 0) {
        Some(JsonValue::Array(items)) => items,
        _ => return JsonValue::Null,
    };
    let idx = arg(h, 1).and_then(parse_integer).unwrap_or(0);
    let resolved = if idx < 0 {
        items.len().checked_sub(idx.unsigned_abs() as usize)
    } else {
        Some(idx as usize)
    };
    resolved
        .and_then(|i| items.get(i))
        .cloned()
        .unwrap_or(JsonValue::Null)
}

pub fn join(h: &Helper<'_, '_>) -> JsonValue {
    match arg(h, 0) {
        Some(JsonValue::String(s)) => JsonValue::String(s.clone()),
        Some(JsonValue::Array(items)) => {
            let separator = str_arg(h, 1).unwrap_or(", ");
            let joined = items.iter().map(to_text).collect::<Vec<_>>().join(separator);
            JsonValue::String(joined)
        }
        _ => empty_string(),
    }
}

pub fn length(h: &Helper<'_, '_>) -> JsonValue {
    let len = match arg(h, 0) {
        Some(JsonValue::String(s)) => s.chars().count(),
        Some(JsonValue::Array(items)) => items.len(),
        Some(JsonValue::Object(map)) => map.len(),
        _ => 0,
    };
    JsonValue::from(len)
}

pub fn has_length(h: &Helper<'_, '_>) -> JsonValue {
    let len = match arg(h, 0) {
        Some(JsonValue::String(s)) => s.chars().count() as i64,
        Some(JsonValue::Array(items)) => items.len() as i64,
        _ => 0,
    };
    let expected = arg(h, 1).and_then(as_integer).unwrap_or(0);
    JsonValue::Bool(len == expected)
}

pub fn in_array(h: &Helper<'_, '_>) -> JsonValue {
    let wanted = h.param(1).map(|p| p.value()).unwrap_or(&EMPTY);
    let found = match arg(h, 0) {
        Some(JsonValue::Array(items)) => items.contains(wanted),
        _ => false,
    };
    JsonValue::Bool(found)
}

pub fn is_array(h: &Helper<'_, '_>) -> JsonValue {
    JsonValue::Bool(matches!(arg(h, 0), Some(JsonValue::Array(_))))
}

/// Project each item through a property path
pub fn map(h: &Helper<'_, '_>) -> JsonValue {
    let items = match arg(h, 0) {
        Some(JsonValue::Array(items)) => items,
        _ => return empty_string(),
    };
    match str_arg(h, 1) {
        Some(path) => JsonValue::Array(
            items
                .iter()
                .map(|item| lookup(item, path).cloned().unwrap_or(JsonValue::Null))
                .collect(),
        ),
        None => JsonValue::Array(items.clone()),
    }
}

/// Values at a property path, skipping items where it is missing
pub fn pluck(h: &Helper<'_, '_>) -> JsonValue {
    let path = str_arg(h, 1).unwrap_or_default();
    match arg(h, 0) {
        None => empty_string(),
        Some(JsonValue::Array(items)) => JsonValue::Array(
            items
                .iter()
                .filter_map(|item| lookup(item, path))
                .filter(|v| !v.is_null())
                .cloned()
                .collect(),
        ),
        Some(_) => JsonValue::Array(Vec::new()),
    }
}

pub fn reverse(h: &Helper<'_, '_>) -> JsonValue {
    match arg(h, 0) {
        Some(JsonValue::Array(items)) => JsonValue::Array(items.iter().rev().cloned().collect()),
        Some(JsonValue::String(s)) if !s.is_empty() => JsonValue::String(s.chars().rev().collect()),
        _ => empty_string(),
    }
}

fn sorted_by_text(items: &[JsonValue]) -> Vec<JsonValue> {
    let mut sorted = items.to_vec();
    sorted.sort_by_cached_key(to_text);
    sorted
}

fn sorted_by_paths(items: &[JsonValue], paths: &[&str]) -> Vec<JsonValue> {
    let mut sorted = items.to_vec();
    sorted.sort_by(|a, b| {
        paths.iter().fold(Ordering::Equal, |ord, path| {
            ord.then_with(|| compare_values(lookup(a, path), lookup(b, path)))
        })
    });
    sorted
}

/// Lexicographic sort, reversed with `reverse=true`
pub fn sort(h: &Helper<'_, '_>) -> JsonValue {
    let items = match arg(h, 0) {
        Some(JsonValue::Array(items)) => items,
        _ => return empty_string(),
    };
    let mut sorted = sorted_by_text(items);
    if hash_flag(h, "reverse") {
        sorted.reverse();
    }
    JsonValue::Array(sorted)
}

/// Stable sort on one or more property paths
pub fn sort_by(h: &Helper<'_, '_>) -> JsonValue {
    let items = match arg(h, 0) {
        Some(JsonValue::Array(items)) => items,
        _ => return JsonValue::Array(Vec::new()),
    };
    let paths: Vec<&str> = h.params().iter().skip(1).filter_map(|p| p.value().as_str()).collect();
    if paths.is_empty() {
        return JsonValue::Array(sorted_by_text(items));
    }
    JsonValue::Array(sorted_by_paths(items, &paths))
}

pub fn union(h: &Helper<'_, '_>) -> JsonValue {
    match (arg(h, 0), arg(h, 1)) {
        (Some(JsonValue::Array(a)), Some(JsonValue::Array(b))) => {
            JsonValue::Array(dedup(a.iter().chain(b.iter()).cloned()))
        }
        _ => JsonValue::Array(Vec::new()),
    }
}

pub fn unique(h: &Helper<'_, '_>) -> JsonValue {
    match arg(h, 0) {
        Some(JsonValue::Array(items)) => JsonValue::Array(dedup(items.iter().cloned())),
        _ => JsonValue::Array(Vec::new()),
    }
}

/// De-duplicate on the value found at a property path
pub fn unique_by(h: &Helper<'_, '_>) -> JsonValue {
    let items = match arg(h, 0) {
        Some(JsonValue::Array(items)) => items,
        _ => return JsonValue::Array(Vec::new()),
    };
    let path = match str_arg(h, 1) {
        Some(path) => path,
        None => return JsonValue::Array(dedup(items.iter().cloned())),
    };

    let mut keys: Vec<&JsonValue> = Vec::new();
    let mut kept = Vec::new();
    for item in items {
        let key = lookup(item, path).unwrap_or(&EMPTY);
        if !keys.contains(&key) {
            keys.push(key);
            kept.push(item.clone());
        }
    }
    JsonValue::Array(kept)
}

fn matches_predicate(item: &JsonValue, predicate: &str) -> bool {
    match predicate {
        "isString" => item.is_string(),
        "isNumber" => item.is_number(),
        "isBoolean" => item.is_boolean(),
        "isArray" => item.is_array(),
        "isObject" => item.is_object(),
        "isNull" => item.is_null(),
        path => lookup(item, path).map(is_truthy).unwrap_or(false),
    }
}

/// `{{#eachIndex array}}{{item}} is {{index}}{{/eachIndex}}`
#[derive(Clone, Copy)]
pub struct EachIndexHelper;

impl HelperDef for EachIndexHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let (template, items) = match (h.template(), arg(h, 0)) {
            (Some(t), Some(JsonValue::Array(items))) => (t, items),
            _ => return render_inverse(h, r, ctx, rc, out),
        };
        let rows = items
            .iter()
            .enumerate()
            .map(|(index, item)| json!({ "item": item, "index": index }));
        render_each(h, template, r, ctx, rc, out, rows)
    }
}

/// Iterates an array; object items gain `index`, `total`, `isFirst` and
/// `isLast`, and `@index` plus any hash arguments are private variables.
#[derive(Clone, Copy)]
pub struct ForEachHelper;

impl HelperDef for ForEachHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let (template, items) = match (h.template(), arg(h, 0)) {
            (Some(t), Some(JsonValue::Array(items))) => (t, items),
            _ => return render_inverse(h, r, ctx, rc, out),
        };

        let total = items.len();
        let decorated = items.iter().enumerate().map(|(i, item)| {
            let position = json!({
                "index": i + 1,
                "total": total,
                "isFirst": i == 0,
                "isLast": i + 1 == total,
            });
            match Frame::with_overlays(item, [&position]) {
                Ok(frame) => frame.into_value(),
                Err(_) => item.clone(),
            }
        });
        render_each(h, template, r, ctx, rc, out, decorated)
    }
}

/// Renders the block when any item satisfies a named predicate
#[derive(Clone, Copy)]
pub struct SomeHelper;

impl HelperDef for SomeHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let predicate = str_arg(h, 1).unwrap_or("isString");
        let found = match arg(h, 0) {
            Some(JsonValue::Array(items)) => items.iter().any(|item| matches_predicate(item, predicate)),
            _ => false,
        };

        match h.template() {
            Some(t) if found => t.render(r, ctx, rc, out),
            _ => render_inverse(h, r, ctx, rc, out),
        }
    }
}

/// Renders the block for each item after index `n`
#[derive(Clone, Copy)]
pub struct WithAfterHelper;

impl HelperDef for WithAfterHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let (template, items) = match (h.template(), arg(h, 0)) {
            (Some(t), Some(JsonValue::Array(items))) => (t, items),
            _ => return Ok(()),
        };
        let n = arg(h, 1).and_then(parse_integer).unwrap_or(0);
        let tail = items[slice_bounds(items.len(), n, None)].to_vec();
        render_each(h, template, r, ctx, rc, out, tail)
    }
}

/// Renders the block with the first item, or once for each of the first `n`
#[derive(Clone, Copy)]
pub struct WithFirstHelper;

impl HelperDef for WithFirstHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let (template, items) = match (h.template(), arg(h, 0)) {
            (Some(t), Some(JsonValue::Array(items))) => (t, items),
            _ => return Ok(()),
        };

        match arg(h, 1).and_then(parse_integer) {
            None => {
                let head = items.first().cloned().unwrap_or(JsonValue::Null);
                render_in_block(template, r, ctx, rc, out, head, None)
            }
            Some(n) => {
                let head = items[slice_bounds(items.len(), 0, Some(n))].to_vec();
                render_each(h, template, r, ctx, rc, out, head)
            }
        }
    }
}

/// Renders the block with the last item, or once for each of the last `n`
#[derive(Clone, Copy)]
pub struct WithLastHelper;

impl HelperDef for WithLastHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let (template, items) = match (h.template(), arg(h, 0)) {
            (Some(t), Some(JsonValue::Array(items))) => (t, items),
            _ => return Ok(()),
        };

        match arg(h, 1).and_then(parse_integer) {
            None => {
                let tail = items.last().cloned().unwrap_or(JsonValue::Null);
                render_in_block(template, r, ctx, rc, out, tail, None)
            }
            Some(n) => {
                let tail = items[slice_bounds(items.len(), -n.abs(), None)].to_vec();
                render_each(h, template, r, ctx, rc, out, tail)
            }
        }
    }
}

/// Renders the block once per consecutive group of `size` items
#[derive(Clone, Copy)]
pub struct WithGroupHelper;

impl HelperDef for WithGroupHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let (template, items) = match (h.template(), arg(h, 0)) {
            (Some(t), Some(JsonValue::Array(items))) if !items.is_empty() => (t, items),
            _ => return Ok(()),
        };

        // a non-positive size yields a single group
        let size = match arg(h, 1).and_then(parse_integer) {
            Some(size) if size > 0 => size as usize,
            _ => items.len(),
        };
        trace!(size, items = items.len(), "grouping items");

        let groups = items.chunks(size).map(|chunk| JsonValue::Array(chunk.to_vec()));
        render_each(h, template, r, ctx, rc, out, groups)
    }
}

/// Renders the block once per item of the sorted array
#[derive(Clone, Copy)]
pub struct WithSortHelper;

impl HelperDef for WithSortHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        r: &'reg Handlebars<'reg>,
        ctx: &'rc Context,
        rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let (template, items) = match (h.template(), arg(h, 0)) {
            (Some(t), Some(JsonValue::Array(items))) => (t, items),
            _ => return Ok(()),
        };

        let mut sorted = match str_arg(h, 1) {
            Some(path) => sorted_by_paths(items, &[path]),
            None => sorted_by_text(items),
        };
        if hash_flag(h, "reverse") {
            sorted.reverse();
        }
        render_each(h, template, r, ctx, rc, out, sorted)
    }
}

pub(crate) fn register(registrar: &mut Registrar<'_, '_>) {
    registrar.add("after", ValueHelper(after));
    registrar.add("toArray", ValueHelper(to_array));
    registrar.add("filter", ValueHelper(filter));
    registrar.add("first", ValueHelper(first));
    registrar.add("last", ValueHelper(last));
    registrar.add("itemAt", ValueHelper(item_at));
    registrar.add("join", ValueHelper(join));
    registrar.add("length", ValueHelper(length));
    registrar.add("isArray", ValueHelper(is_array));
    registrar.add("map", ValueHelper(map));
    registrar.add("pluck", ValueHelper(pluck));
    registrar.add("reverse", ValueHelper(reverse));
    registrar.add("sort", ValueHelper(sort));
    registrar.add("sortBy", ValueHelper(sort_by));
    registrar.add("union", ValueHelper(union));
    registrar.add("unique", ValueHelper(unique));
    registrar.add("uniqueBy", ValueHelper(unique_by));
    registrar.add(
        "hasLength",
        BlockOrValue {
            value: has_length,
            scope: BlockScope::Current,
        },
    );
    registrar.add(
        "inArray",
        BlockOrValue {
            value: in_array,
            scope: BlockScope::Current,
        },
    );
    registrar.add("eachIndex", EachIndexHelper);
    registrar.add("forEach", ForEachHelper);
    registrar.add("some", SomeHelper);
    registrar.add("withAfter", WithAfterHelper);
    registrar.add("withFirst", WithFirstHelper);
    registrar.add("withLast", WithLastHelper);
    registrar.add("withGroup", WithGroupHelper);
    registrar.add("withSort", WithSortHelper);
}
