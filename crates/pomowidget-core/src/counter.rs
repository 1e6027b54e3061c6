//! The counter widget: one integer and three buttons.

use serde::Serialize;

/// What the counter display shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterView {
    pub text: String,
    pub negative: bool,
    pub reset_enabled: bool,
}

type RenderFn = Box<dyn FnMut(&CounterView)>;

/// A counter that re-renders after every mutation.
pub struct Counter {
    value: i64,
    on_render: RenderFn,
}

impl Counter {
    pub fn new(render: impl FnMut(&CounterView) + 'static) -> Self {
        Self {
            value: 0,
            on_render: Box::new(render),
        }
    }

    pub fn value(&self) -> i64 {
        self.value
    }

    pub fn view(&self) -> CounterView {
        CounterView {
            text: self.value.to_string(),
            negative: self.value < 0,
            reset_enabled: self.value != 0,
        }
    }

    pub fn increment(&mut self) {
        self.value = self.value.saturating_add(1);
        self.render();
    }

    pub fn decrement(&mut self) {
        self.value = self.value.saturating_sub(1);
        self.render();
    }

    pub fn reset(&mut self) {
        self.value = 0;
        self.render();
    }

    pub fn render(&mut self) {
        let view = self.view();
        (self.on_render)(&view);
    }
}

impl Default for Counter {
    fn default() -> Self {
        Self::new(|_| {})
    }
}
