//! Shared test fixtures used across unit and integration tests.
//!
//! Provides an in-memory widget tree implementing the host observation
//! surface, and a recording speech engine for asserting controller output.

use crate::tts::SpeechEngine;
use crate::ui::{Rect, UiSnapshot, Widget, WidgetId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// In-memory widget node.
#[derive(Debug, Default, Clone)]
pub struct FakeWidget {
    text: Option<String>,
    hidden: bool,
    bounds: Option<Rect>,
    children: Vec<FakeWidget>,
    static_children: Vec<FakeWidget>,
    dynamic_children: Vec<FakeWidget>,
}

impl FakeWidget {
    /// Leaf widget with text and no bounds.
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_owned()),
            ..Self::default()
        }
    }

    /// Container with layout children and no text.
    pub fn container(children: Vec<FakeWidget>) -> Self {
        Self {
            children,
            ..Self::default()
        }
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_static_children(mut self, children: Vec<FakeWidget>) -> Self {
        self.static_children = children;
        self
    }

    pub fn with_dynamic_children(mut self, children: Vec<FakeWidget>) -> Self {
        self.dynamic_children = children;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }
}

impl Widget for FakeWidget {
    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn is_hidden(&self) -> bool {
        self.hidden
    }

    fn bounds(&self) -> Option<Rect> {
        self.bounds
    }

    fn children(&self) -> Vec<&dyn Widget> {
        self.children.iter().map(|c| c as &dyn Widget).collect()
    }

    fn static_children(&self) -> Vec<&dyn Widget> {
        self.static_children
            .iter()
            .map(|c| c as &dyn Widget)
            .collect()
    }

    fn dynamic_children(&self) -> Vec<&dyn Widget> {
        self.dynamic_children
            .iter()
            .map(|c| c as &dyn Widget)
            .collect()
    }
}

/// In-memory UI snapshot: a map from widget address to tree.
#[derive(Debug, Default)]
pub struct FakeUi {
    widgets: HashMap<WidgetId, FakeWidget>,
    canvas_width: i32,
    canvas_height: i32,
}

impl FakeUi {
    pub fn new(canvas_width: i32, canvas_height: i32) -> Self {
        Self {
            widgets: HashMap::new(),
            canvas_width,
            canvas_height,
        }
    }

    /// Insert (or replace) the widget at `id`.
    pub fn insert(&mut self, id: WidgetId, widget: FakeWidget) {
        self.widgets.insert(id, widget);
    }

    pub fn remove(&mut self, id: WidgetId) {
        self.widgets.remove(&id);
    }
}

impl UiSnapshot for FakeUi {
    fn widget(&self, id: WidgetId) -> Option<&dyn Widget> {
        self.widgets.get(&id).map(|w| w as &dyn Widget)
    }

    fn canvas_width(&self) -> i32 {
        self.canvas_width
    }

    fn canvas_height(&self) -> i32 {
        self.canvas_height
    }
}

/// Speech engine that records every call for later assertions.
#[derive(Debug, Default)]
pub struct RecordingEngine {
    spoken: Mutex<Vec<String>>,
    stops: AtomicUsize,
    shutdowns: AtomicUsize,
}

impl RecordingEngine {
    /// Returns a fresh engine plus a handle that stays valid after the
    /// controller takes ownership of the boxed engine.
    pub fn new() -> (Box<dyn SpeechEngine>, Arc<RecordingEngine>) {
        let engine = Arc::new(RecordingEngine::default());
        (Box::new(SharedEngine(Arc::clone(&engine))), engine)
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().expect("spoken lock").clone()
    }

    pub fn speak_count(&self) -> usize {
        self.spoken.lock().expect("spoken lock").len()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn shutdown_count(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }
}

/// Boxable wrapper so tests can keep an [`Arc`] handle to the recorder.
struct SharedEngine(Arc<RecordingEngine>);

impl SpeechEngine for SharedEngine {
    fn is_available(&self) -> bool {
        true
    }

    fn speak(&self, text: &str) {
        self.0
            .spoken
            .lock()
            .expect("spoken lock")
            .push(text.to_owned());
    }

    fn stop_now(&self) {
        self.0.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn shutdown(&self) {
        self.0.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}
