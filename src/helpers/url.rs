// ABOUTME: URL helpers for component encoding, resolution and parsing
// ABOUTME: Parsed URLs render as their href inline and expose their parts in subexpressions

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderError,
    ScopedJson,
};
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{json, Value as JsonValue};
use tracing::debug;
use url::Url;

use super::block::ValueHelper;
use super::json::str_arg;
use super::Registrar;

/// Bytes escaped by `encodeURIComponent`: everything except ASCII
/// alphanumerics and `- _ . ! ~ * ' ( )`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(input: &str) -> String {
    utf8_percent_encode(input, COMPONENT).to_string()
}

pub fn encode_uri_component(h: &Helper<'_, '_>) -> JsonValue {
    match str_arg(h, 0) {
        Some(s) => JsonValue::String(encode_component(s)),
        None => JsonValue::Null,
    }
}

pub fn decode_uri_component(h: &Helper<'_, '_>) -> JsonValue {
    let input = match str_arg(h, 0) {
        Some(s) => s,
        None => return JsonValue::Null,
    };
    match percent_decode_str(input).decode_utf8() {
        Ok(decoded) => JsonValue::String(decoded.into_owned()),
        Err(e) => {
            debug!("decodeURIComponent: {:?} is not valid UTF-8: {}", input, e);
            JsonValue::String(String::new())
        }
    }
}

/// Resolve `href` against `base` the way a browser resolves a link
pub fn resolve(base: &str, href: &str) -> Option<String> {
    Url::parse(base)
        .and_then(|base| base.join(href))
        .map(String::from)
        .map_err(|e| debug!("urlResolve: cannot resolve {:?} against {:?}: {}", href, base, e))
        .ok()
}

pub fn url_resolve(h: &Helper<'_, '_>) -> JsonValue {
    let resolved = match (str_arg(h, 0), str_arg(h, 1)) {
        (Some(base), Some(href)) => resolve(base, href),
        _ => None,
    };
    JsonValue::String(resolved.unwrap_or_default())
}

/// Break a URL into its parts. Search and hash keep their leading `?` and
/// `#`, the port is empty for a scheme's default.
pub fn parse(input: &str) -> Option<JsonValue> {
    let url = match Url::parse(input) {
        Ok(url) => url,
        Err(e) => {
            debug!("urlParse: {:?} is not a URL: {}", input, e);
            return None;
        }
    };

    let hostname = url.host_str().unwrap_or_default().to_string();
    let port = url.port().map(|p| p.to_string()).unwrap_or_default();
    let host = if port.is_empty() {
        hostname.clone()
    } else {
        format!("{}:{}", hostname, port)
    };
    let search = match url.query() {
        Some(q) if !q.is_empty() => format!("?{}", q),
        _ => String::new(),
    };
    let hash = match url.fragment() {
        Some(f) if !f.is_empty() => format!("#{}", f),
        _ => String::new(),
    };

    Some(json!({
        "href": url.as_str(),
        "protocol": format!("{}:", url.scheme()),
        "username": url.username(),
        "password": url.password().unwrap_or_default(),
        "host": host,
        "hostname": hostname,
        "port": port,
        "pathname": url.path(),
        "search": search,
        "hash": hash,
        "origin": url.origin().ascii_serialization(),
    }))
}

/// Parses its argument into URL parts. Rendered inline it writes the
/// normalized href.
#[derive(Clone, Copy)]
pub struct UrlParseHelper;

impl UrlParseHelper {
    fn parsed(h: &Helper<'_, '_>) -> Option<JsonValue> {
        str_arg(h, 0).and_then(parse)
    }
}

impl HelperDef for UrlParseHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        let parsed = Self::parsed(h).unwrap_or_else(|| JsonValue::String(String::new()));
        Ok(ScopedJson::Derived(parsed))
    }

    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        if let Some(href) = Self::parsed(h).as_ref().and_then(|p| p["href"].as_str()) {
            out.write(href)?;
        }
        Ok(())
    }
}

/// Everything before the first `?`
pub fn strip_querystring(h: &Helper<'_, '_>) -> JsonValue {
    match h.param(0).map(|p| p.value()) {
        Some(JsonValue::String(s)) => {
            JsonValue::String(s.split('?').next().unwrap_or_default().to_string())
        }
        Some(other) => other.clone(),
        None => JsonValue::Null,
    }
}

pub(crate) fn register(registrar: &mut Registrar<'_, '_>) {
    registrar.add("encodeURIComponent", ValueHelper(encode_uri_component));
    registrar.add("decodeURIComponent", ValueHelper(decode_uri_component));
    registrar.add("urlResolve", ValueHelper(url_resolve));
    registrar.add("urlParse", UrlParseHelper);
    registrar.add("stripQuerystring", ValueHelper(strip_querystring));
}
