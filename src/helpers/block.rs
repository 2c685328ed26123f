// ABOUTME: Rendering support shared by helpers that produce values or render nested blocks
// ABOUTME: Pushes block contexts whose private variables come from a context frame

use handlebars::{
    BlockContext, Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
    RenderError, Renderable, ScopedJson, Template,
};
use serde_json::Value as JsonValue;

use super::json::is_truthy;
use crate::frame::Frame;

/// Computes a value from the helper arguments.
pub(crate) type ValueFn = fn(&Helper<'_, '_>) -> JsonValue;

/// Helper whose result is a JSON value, usable inline and in subexpressions.
pub(crate) struct ValueHelper(pub ValueFn);

impl HelperDef for ValueHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        Ok(ScopedJson::Derived((self.0)(h)))
    }
}

/// Which context the main block sees when a [`BlockOrValue`] helper is
/// used as a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BlockScope {
    /// The block renders against the surrounding context.
    Current,
    /// The block renders with the computed value as `this`.
    Value,
}

/// A value helper that, used as a block, renders the main block when the
/// value is truthy and the inverse block otherwise.
pub(crate) struct BlockOrValue {
    pub value: ValueFn,
    pub scope: BlockScope,
}

impl HelperDef for BlockOrValue {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'reg, 'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'reg, 'rc>, RenderError> {
        Ok(ScopedJson::Derived((self.value)(h)))
    }

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
            None => return ValueHelper(self.value).call(h, r, ctx, rc, out),
        };

        let value = (self.value)(h);
        if !is_truthy(&value) {
            return render_inverse(h, r, ctx, rc, out);
        }

        match self.scope {
            BlockScope::Current => template.render(r, ctx, rc, out),
            BlockScope::Value => render_in_block(template, r, ctx, rc, out, value, None),
        }
    }
}

/// Render the `{{else}}` branch of a block helper, if any.
pub(crate) fn render_inverse<'reg: 'rc, 'rc>(
    h: &Helper<'reg, 'rc>,
    r: &'reg Handlebars<'reg>,
    ctx: &'rc Context,
    rc: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
) -> HelperResult {
    match h.inverse() {
        Some(t) => t.render(r, ctx, rc, out),
        None => Ok(()),
    }
}

/// Render `template` with `base` as `this`. When a frame is given, its
/// visible data becomes the block's private `@` variables.
pub fn render_in_block<'reg: 'rc, 'rc>(
    template: &'reg Template,
    r: &'reg Handlebars<'reg>,
    ctx: &'rc Context,
    rc: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
    base: JsonValue,
    frame: Option<&Frame<'_>>,
) -> HelperResult {
    let mut block = BlockContext::new();
    block.set_base_value(base);
    if let Some(frame) = frame {
        for (key, value) in frame.iter() {
            block.set_local_var(key, value.clone());
        }
    }

    rc.push_block(block);
    let result = template.render(r, ctx, rc, out);
    rc.pop_block();
    result
}

/// Render `template` once per item, exposing `@index` plus the helper's
/// hash arguments as private variables through a frame.
pub(crate) fn render_each<'reg: 'rc, 'rc, I>(
    h: &Helper<'reg, 'rc>,
    template: &'reg Template,
    r: &'reg Handlebars<'reg>,
    ctx: &'rc Context,
    rc: &mut RenderContext<'reg, 'rc>,
    out: &mut dyn Output,
    items: I,
) -> HelperResult
where
    I: IntoIterator<Item = JsonValue>,
{
    let extras = super::json::hash_object(h);
    let mut frame = Frame::new(&extras)?;
    for (index, item) in items.into_iter().enumerate() {
        frame.insert("index", JsonValue::from(index));
        render_in_block(template, r, ctx, rc, out, item, Some(&frame))?;
    }
    Ok(())
}
