//! Rendering context chain
//!
//! A template host exposes its nested invocation scopes through
//! [`ParentData`]; [`ContextStack`] is an owned implementation for hosts
//! (and tests) that keep their own frame list.

use serde_json::Value;
use crate::scope::bundle::ScopeBundle;
use crate::utils::errors::Result;

/// Reserved key under which a frame's data carries its locale bundle
pub const INTL_KEY: &str = "intl";

/// One scope of the rendering context
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Template data for this scope
    pub data: Value,
    /// Locale data this scope contributes, if any
    pub intl: Option<ScopeBundle>,
}

impl Frame {
    /// Frame carrying only template data
    pub fn new(data: Value) -> Self {
        Self { data, intl: None }
    }

    /// Frame contributing a locale bundle
    pub fn with_intl(data: Value, intl: ScopeBundle) -> Self {
        Self { data, intl: Some(intl) }
    }

    /// Build a frame from template data, lifting a reserved `intl` object into a typed bundle
    pub fn from_data(mut data: Value) -> Result<Self> {
        let intl = match data.as_object_mut().and_then(|map| map.remove(INTL_KEY)) {
            Some(Value::Null) | None => None,
            Some(raw) => Some(ScopeBundle::from_value(raw)?),
        };
        Ok(Self { data, intl })
    }
}

/// Parent-scope lookup exposed by the host renderer
pub trait ParentData {
    /// Frame `depth` levels out from the current one (0 = innermost); `None` past the root
    fn parent_data(&self, depth: usize) -> Option<&Frame>;
}

/// Owned frame list, root first
#[derive(Debug, Clone, Default)]
pub struct ContextStack {
    frames: Vec<Frame>,
}

impl ContextStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stack with a single root frame
    pub fn with_root(root: Frame) -> Self {
        Self { frames: vec![root] }
    }

    /// Enter a nested scope
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Leave the innermost scope
    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl ParentData for ContextStack {
    fn parent_data(&self, depth: usize) -> Option<&Frame> {
        let index = self.frames.len().checked_sub(depth + 1)?;
        self.frames.get(index)
    }
}

impl FromIterator<Frame> for ContextStack {
    fn from_iter<T: IntoIterator<Item = Frame>>(iter: T) -> Self {
        Self { frames: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parent_data_counts_from_innermost() {
        let mut stack = ContextStack::with_root(Frame::new(json!({"level": "root"})));
        stack.push(Frame::new(json!({"level": "page"})));
        stack.push(Frame::new(json!({"level": "item"})));

        assert_eq!(stack.parent_data(0).unwrap().data["level"], "item");
        assert_eq!(stack.parent_data(2).unwrap().data["level"], "root");
        assert!(stack.parent_data(3).is_none());

        stack.pop();
        assert_eq!(stack.parent_data(0).unwrap().data["level"], "page");
        assert_eq!(stack.depth(), 2);
    }

    #[test]
    fn test_from_data_lifts_reserved_key() {
        let frame = Frame::from_data(json!({
            "title": "Hi",
            "intl": {"locales": ["de-DE"]}
        }))
        .unwrap();

        assert_eq!(frame.intl.unwrap().locales, Some(vec!["de-DE".to_string()]));
        assert!(frame.data.get("intl").is_none());
        assert_eq!(frame.data["title"], "Hi");

        assert!(Frame::from_data(json!({"intl": null})).unwrap().intl.is_none());
        assert!(Frame::from_data(json!({"intl": {"messages": {"x": 1}}})).is_err());
    }

    #[test]
    fn test_empty_stack_has_no_frames() {
        assert!(ContextStack::new().parent_data(0).is_none());
    }
}
