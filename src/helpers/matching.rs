// ABOUTME: Glob matching helper compiling shell-style patterns into anchored regular expressions
// ABOUTME: Supports *, **, ?, character classes and {a,b} alternatives with dotfile and case options

use handlebars::Helper;
use regex::{Regex, RegexBuilder};
use serde_json::Value as JsonValue;
use tracing::debug;

use super::block::ValueHelper;
use super::json::{arg, hash_flag, str_arg};
use super::Registrar;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GlobOptions {
    /// Let wildcards match path segments that start with a dot.
    pub dot: bool,
    pub nocase: bool,
}

/// A compiled glob pattern.
#[derive(Debug, Clone)]
pub struct Glob {
    regex: Regex,
}

impl Glob {
    pub fn new(pattern: &str, options: GlobOptions) -> Result<Self, regex::Error> {
        let chars: Vec<char> = pattern.chars().collect();
        let source = format!("^{}$", translate(&chars, options, true));
        let regex = RegexBuilder::new(&source)
            .case_insensitive(options.nocase)
            .build()?;
        Ok(Self { regex })
    }

    pub fn is_match(&self, path: &str) -> bool {
        let path = path.strip_prefix("./").unwrap_or(path);
        self.regex.is_match(path)
    }
}

/// Any one path segment the options allow a wildcard to match.
fn segment(options: GlobOptions) -> &'static str {
    if options.dot {
        "[^/]+"
    } else {
        "[^/.][^/]*"
    }
}

fn translate(chars: &[char], options: GlobOptions, mut at_segment_start: bool) -> String {
    let mut out = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                out.push_str(&regex::escape(&chars[i + 1].to_string()));
                at_segment_start = false;
                i += 2;
            }
            '*' => {
                let run = chars[i..].iter().take_while(|c| **c == '*').count();
                let next = chars.get(i + run);
                let whole_segment = at_segment_start && matches!(next, None | Some('/'));

                if run >= 2 && whole_segment {
                    if next.is_some() {
                        out.push_str(&format!("(?:{}/)*", segment(options)));
                        i += run + 1;
                    } else {
                        let seg = segment(options);
                        out.push_str(&format!("(?:{}(?:/{})*)?", seg, seg));
                        i += run;
                    }
                    continue;
                }

                if at_segment_start && !options.dot {
                    out.push_str("(?:[^/.][^/]*)?");
                } else {
                    out.push_str("[^/]*");
                }
                at_segment_start = false;
                i += run;
            }
            '?' => {
                out.push_str(if at_segment_start && !options.dot {
                    "[^/.]"
                } else {
                    "[^/]"
                });
                at_segment_start = false;
                i += 1;
            }
            '[' => match class_end(chars, i) {
                Some(end) => {
                    out.push_str(&translate_class(&chars[i + 1..end]));
                    at_segment_start = false;
                    i = end + 1;
                }
                None => {
                    out.push_str(r"\[");
                    at_segment_start = false;
                    i += 1;
                }
            },
            '{' => match split_braces(chars, i) {
                Some((alternatives, end)) => {
                    let compiled: Vec<String> = alternatives
                        .iter()
                        .map(|alt| translate(alt, options, at_segment_start))
                        .collect();
                    out.push_str(&format!("(?:{})", compiled.join("|")));
                    at_segment_start = false;
                    i = end + 1;
                }
                None => {
                    out.push_str(r"\{");
                    at_segment_start = false;
                    i += 1;
                }
            },
            '/' => {
                out.push('/');
                at_segment_start = true;
                i += 1;
            }
            c => {
                out.push_str(&regex::escape(&c.to_string()));
                at_segment_start = false;
                i += 1;
            }
        }
    }
    out
}

/// Index of the `]` closing the class opened at `start`. A `]` directly
/// after the opening bracket (or its negation) is literal.
fn class_end(chars: &[char], start: usize) -> Option<usize> {
    let mut i = start + 1;
    if matches!(chars.get(i), Some('!') | Some('^')) {
        i += 1;
    }
    if chars.get(i) == Some(&']') {
        i += 1;
    }
    (i..chars.len()).find(|&j| chars[j] == ']')
}

fn translate_class(body: &[char]) -> String {
    let (negated, body) = match body.first() {
        Some('!') | Some('^') => (true, &body[1..]),
        _ => (false, body),
    };
    let mut out = String::from(if negated { "[^/" } else { "[" });
    for c in body {
        match c {
            '\\' | '[' | ']' | '^' | '&' | '~' => {
                out.push('\\');
                out.push(*c);
            }
            _ => out.push(*c),
        }
    }
    out.push(']');
    out
}

/// Top-level alternatives of the brace group opened at `start`, plus the
/// index of its closing brace. Groups without a comma are literal.
fn split_braces(chars: &[char], start: usize) -> Option<(Vec<&[char]>, usize)> {
    let mut depth = 0;
    let mut alternatives = Vec::new();
    let mut from = start + 1;

    for (j, c) in chars.iter().enumerate().skip(start) {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    if alternatives.is_empty() {
                        return None;
                    }
                    alternatives.push(&chars[from..j]);
                    return Some((alternatives, j));
                }
            }
            ',' if depth == 1 => {
                alternatives.push(&chars[from..j]);
                from = j + 1;
            }
            _ => {}
        }
    }
    None
}

/// True when `path` matches `pattern`. Invalid patterns match nothing.
pub fn glob_match(path: &str, pattern: &str, options: GlobOptions) -> bool {
    match Glob::new(pattern, options) {
        Ok(glob) => glob.is_match(path),
        Err(e) => {
            debug!("isMatch: ignoring invalid pattern {:?}: {}", pattern, e);
            false
        }
    }
}

/// `isMatch path pattern`: the pattern may also be an array of patterns
pub fn is_match(h: &Helper<'_, '_>) -> JsonValue {
    let options = GlobOptions {
        dot: hash_flag(h, "dot"),
        nocase: hash_flag(h, "nocase"),
    };
    let path = match str_arg(h, 0) {
        Some(path) => path,
        None => return JsonValue::Bool(false),
    };

    let matched = match arg(h, 1) {
        Some(JsonValue::String(pattern)) => glob_match(path, pattern, options),
        Some(JsonValue::Array(patterns)) => patterns
            .iter()
            .filter_map(|p| p.as_str())
            .any(|pattern| glob_match(path, pattern, options)),
        _ => false,
    };
    JsonValue::Bool(matched)
}

pub(crate) fn register(registrar: &mut Registrar<'_, '_>) {
    registrar.add("isMatch", ValueHelper(is_match));
}
