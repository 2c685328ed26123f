// ABOUTME: Context frames for block helpers rendering nested template fragments
// ABOUTME: A frame copies a parent object, keeps a back-reference to it, and layers overlays on top

use serde_json::{Map, Value as JsonValue};

use crate::error::FrameError;

/// A child rendering context derived from a parent object.
///
/// The visible data is an owned shallow copy of the parent's keys with any
/// overlays applied on top. The parent itself is held out of band, so
/// iterating the frame only ever yields data keys.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<'p> {
    parent: &'p JsonValue,
    data: Map<String, JsonValue>,
}

impl<'p> Frame<'p> {
    /// Build a frame from a plain object.
    pub fn new(source: &'p JsonValue) -> Result<Self, FrameError> {
        match source {
            JsonValue::Object(map) => Ok(Self {
                parent: source,
                data: map.clone(),
            }),
            other => Err(FrameError::InvalidArgument(kind_of(other))),
        }
    }

    /// Build a frame and apply each overlay in order.
    ///
    /// Overlays that are not objects (including `null`) contribute nothing.
    pub fn with_overlays<'o, I>(source: &'p JsonValue, overlays: I) -> Result<Self, FrameError>
    where
        I: IntoIterator<Item = &'o JsonValue>,
    {
        let mut frame = Self::new(source)?;
        for overlay in overlays {
            frame.extend(overlay);
        }
        Ok(frame)
    }

    /// Shallow-merge `overlay` into the frame, overwriting existing keys.
    pub fn extend(&mut self, overlay: &JsonValue) -> &mut Self {
        if let JsonValue::Object(map) = overlay {
            self.extend_map(map);
        }
        self
    }

    pub fn extend_map(&mut self, overlay: &Map<String, JsonValue>) -> &mut Self {
        for (key, value) in overlay {
            self.data.insert(key.clone(), value.clone());
        }
        self
    }

    /// The exact object this frame was derived from.
    pub fn parent(&self) -> &'p JsonValue {
        self.parent
    }

    /// True when `candidate` is the very instance this frame was built from.
    pub fn is_child_of(&self, candidate: &JsonValue) -> bool {
        std::ptr::eq(self.parent, candidate)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: JsonValue) -> Option<JsonValue> {
        self.data.insert(key.into(), value)
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.data.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.data.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.data.iter()
    }

    pub fn data(&self) -> &Map<String, JsonValue> {
        &self.data
    }

    pub fn into_data(self) -> Map<String, JsonValue> {
        self.data
    }

    /// Consume the frame into a JSON object of its visible data.
    pub fn into_value(self) -> JsonValue {
        JsonValue::Object(self.data)
    }
}

/// Build a frame from `source` with `overlays` applied left to right.
pub fn create_frame<'p, 'o, I>(source: &'p JsonValue, overlays: I) -> Result<Frame<'p>, FrameError>
where
    I: IntoIterator<Item = &'o JsonValue>,
{
    Frame::with_overlays(source, overlays)
}

fn kind_of(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_frame_copies_source() {
        let source = json!({"a": 1, "b": "two"});
        let frame = Frame::new(&source).unwrap();

        assert_eq!(frame.len(), 2);
        assert_eq!(frame.get("a"), Some(&json!(1)));
        assert_eq!(frame.get("b"), Some(&json!("two")));
        assert!(frame.is_child_of(&source));
        assert_eq!(frame.parent(), &source);
    }

    #[test]
    fn test_parent_is_identity_not_equality() {
        let source = json!({"a": 1});
        let lookalike = json!({"a": 1});
        let frame = Frame::new(&source).unwrap();

        assert!(frame.is_child_of(&source));
        assert!(!frame.is_child_of(&lookalike));
    }

    #[test]
    fn test_overlays_apply_in_order() {
        let source = json!({"a": 1, "b": 2});
        let first = json!({"b": 3, "c": 4});
        let second = json!({"c": 5});
        let frame = create_frame(&source, [&first, &second]).unwrap();

        assert_eq!(frame.into_value(), json!({"a": 1, "b": 3, "c": 5}));
    }

    #[test]
    fn test_overlay_wins_over_source() {
        let source = json!({"a": 1, "b": 2});
        let overlay = json!({"b": 3, "c": 4});
        let frame = create_frame(&source, [&overlay]).unwrap();

        assert_eq!(frame.data(), json!({"a": 1, "b": 3, "c": 4}).as_object().unwrap());
        assert_eq!(frame.parent(), &json!({"a": 1, "b": 2}));
    }

    #[test]
    fn test_extend_chains() {
        let source = json!({"x": "a"});
        let mut frame = Frame::new(&source).unwrap();
        frame.extend(&json!({"y": "b"})).extend(&json!({"x": "c"}));

        assert_eq!(frame.into_value(), json!({"x": "c", "y": "b"}));
    }

    #[test]
    fn test_extend_matches_construction_overlay() {
        let source = json!({"a": 1, "nested": {"k": true}});
        let overlay = json!({"nested": {"other": false}, "z": null});

        let mut extended = Frame::new(&source).unwrap();
        extended.extend(&overlay);
        let constructed = create_frame(&source, [&overlay]).unwrap();

        assert_eq!(extended, constructed);
    }

    #[test]
    fn test_extend_is_shallow() {
        let source = json!({"nested": {"a": 1, "b": 2}});
        let mut frame = Frame::new(&source).unwrap();
        frame.extend(&json!({"nested": {"c": 3}}));

        assert_eq!(frame.get("nested"), Some(&json!({"c": 3})));
    }

    #[test]
    fn test_empty_and_null_overlays_are_skipped() {
        let source = json!({"a": 1});
        let frame = create_frame(&source, [&JsonValue::Null, &json!({}), &json!(false), &json!("str")])
            .unwrap();
        assert_eq!(frame.into_value(), json!({"a": 1}));

        let mut frame = Frame::new(&source).unwrap();
        frame.extend(&JsonValue::Null).extend(&json!({}));
        assert_eq!(frame.keys().collect::<Vec<_>>(), vec!["a"]);
    }

    #[test]
    fn test_rejects_non_objects() {
        for value in [json!(5), json!("x"), json!(["a"]), JsonValue::Null, json!(true)] {
            let err = Frame::new(&value).unwrap_err();
            assert!(matches!(err, FrameError::InvalidArgument(_)));
        }
        assert_eq!(
            Frame::new(&json!(["a"])).unwrap_err(),
            FrameError::InvalidArgument("array")
        );
    }

    #[test]
    fn test_mutation_does_not_touch_inputs() {
        let source = json!({"a": 1});
        let overlay = json!({"b": 2});
        let mut frame = create_frame(&source, [&overlay]).unwrap();

        frame.insert("c", json!(3));
        frame.extend(&json!({"a": 10}));

        assert_eq!(source, json!({"a": 1}));
        assert_eq!(overlay, json!({"b": 2}));
        assert_eq!(frame.get("a"), Some(&json!(10)));
    }

    #[test]
    fn test_iteration_yields_only_data() {
        let source = json!({"a": 1});
        let frame = Frame::new(&source).unwrap();
        let pairs: Vec<_> = frame.iter().collect();

        assert_eq!(pairs, vec![(&"a".to_string(), &json!(1))]);
        assert!(!frame.contains_key("parent"));
        assert!(!frame.contains_key("extend"));
    }
}
