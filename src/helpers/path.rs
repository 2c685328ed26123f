// ABOUTME: File path helpers using POSIX path semantics regardless of the host platform
// ABOUTME: Provides dirname, basename, stem, extname, relative and segment slicing

use handlebars::Helper;
use serde_json::Value as JsonValue;

use super::block::ValueHelper;
use super::json::{arg, parse_integer, slice_bounds, str_arg};
use super::Registrar;

/// String operations on `/`-separated paths.
pub mod posix {
    fn trim_trailing(path: &str) -> &str {
        let trimmed = path.trim_end_matches('/');
        if trimmed.is_empty() && path.starts_with('/') {
            "/"
        } else {
            trimmed
        }
    }

    pub fn basename(path: &str) -> &str {
        let trimmed = trim_trailing(path);
        if trimmed == "/" {
            return "";
        }
        match trimmed.rfind('/') {
            Some(idx) => &trimmed[idx + 1..],
            None => trimmed,
        }
    }

    pub fn dirname(path: &str) -> &str {
        if path.is_empty() {
            return ".";
        }
        let trimmed = trim_trailing(path);
        if trimmed == "/" {
            return "/";
        }
        match trimmed.rfind('/') {
            None => ".",
            Some(idx) => {
                let parent = trimmed[..idx].trim_end_matches('/');
                if parent.is_empty() {
                    "/"
                } else {
                    parent
                }
            }
        }
    }

    /// Extension including the leading dot; dotfiles have none.
    pub fn extname(path: &str) -> &str {
        let base = basename(path);
        if base == ".." {
            return "";
        }
        match base.rfind('.') {
            Some(idx) if idx > 0 => &base[idx..],
            _ => "",
        }
    }

    pub fn stem(path: &str) -> &str {
        let base = basename(path);
        &base[..base.len() - extname(path).len()]
    }

    /// Absolute, normalized segments of `path` resolved against `/`.
    pub fn resolve(path: &str) -> Vec<&str> {
        let mut segments: Vec<&str> = Vec::new();
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                other => segments.push(other),
            }
        }
        segments
    }

    pub fn relative(from: &str, to: &str) -> String {
        let from = resolve(from);
        let to = resolve(to);
        let common = from
            .iter()
            .zip(to.iter())
            .take_while(|(a, b)| a == b)
            .count();

        let mut parts: Vec<&str> = vec![".."; from.len() - common];
        parts.extend_from_slice(&to[common..]);
        parts.join("/")
    }
}

fn with_path(h: &Helper<'_, '_>, f: fn(&str) -> &str) -> JsonValue {
    let result = str_arg(h, 0).map(f).unwrap_or_default();
    JsonValue::String(result.to_string())
}

pub fn dirname(h: &Helper<'_, '_>) -> JsonValue {
    with_path(h, posix::dirname)
}

pub fn basename(h: &Helper<'_, '_>) -> JsonValue {
    with_path(h, posix::basename)
}

pub fn stem(h: &Helper<'_, '_>) -> JsonValue {
    with_path(h, posix::stem)
}

pub fn extname(h: &Helper<'_, '_>) -> JsonValue {
    with_path(h, posix::extname)
}

/// Relative path from the first path to the second
pub fn relative(h: &Helper<'_, '_>) -> JsonValue {
    match (str_arg(h, 0), str_arg(h, 1)) {
        (Some(from), Some(to)) => JsonValue::String(posix::relative(from, to)),
        _ => JsonValue::String(String::new()),
    }
}

/// Segments `[a, b)` of a path split on either separator, joined with `/`
pub fn segments(h: &Helper<'_, '_>) -> JsonValue {
    let path = match str_arg(h, 0) {
        Some(path) => path,
        None => return JsonValue::String(String::new()),
    };
    let parts: Vec<&str> = path.split(['/', '\\']).filter(|s| !s.is_empty()).collect();
    let start = arg(h, 1).and_then(parse_integer).unwrap_or(0);
    let end = arg(h, 2).and_then(parse_integer);
    JsonValue::String(parts[slice_bounds(parts.len(), start, end)].join("/"))
}

pub(crate) fn register(registrar: &mut Registrar<'_, '_>) {
    registrar.add("dirname", ValueHelper(dirname));
    registrar.add("basename", ValueHelper(basename));
    registrar.add("stem", ValueHelper(stem));
    registrar.add("extname", ValueHelper(extname));
    registrar.add("relative", ValueHelper(relative));
    registrar.add("segments", ValueHelper(segments));
}
