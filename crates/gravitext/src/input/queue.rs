use crate::core::gravity::GravityDirection;

/// Player actions forwarded by the page.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Text typed into the word box, dropped at world coordinates (x, y).
    SubmitWord { text: String, x: f32, y: f32 },
    ToggleGravity,
    SetGravityDirection(GravityDirection),
    /// Gravity strength slider (0.0 to 3.0).
    SetGravityStrength(f32),
    /// Mode button; the name is validated by the mode controller.
    SelectMode(String),
    ClearAll,
    ToggleSound,
    ToggleMusic,
    CloseTutorial,
    /// The canvas changed size.
    Resize { width: f32, height: f32 },
}

/// A queue of input events.
/// JS writes events into the queue; Rust reads and drains them each frame.
pub struct InputQueue {
    events: Vec<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self {
            events: Vec::with_capacity(16),
        }
    }

    pub fn push(&mut self, event: InputEvent) {
        self.events.push(event);
    }

    /// Drain all pending events. Returns a Vec and clears the queue.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new()
    }
}
