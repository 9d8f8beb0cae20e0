//! Input events for simulations.
//!
//! Hosts push pointer and resize events from their own event callbacks with
//! [`Simulation::push_event`](crate::Simulation::push_event). Events are only
//! queued there; the simulation drains the queue at the start of the next
//! tick, so injected particles always go through the pool between particle
//! updates, never in the middle of one.
//!
//! [`Input`] also tracks continuous state (pointer position, button held),
//! which scenes use for drags.
//!
//! ```ignore
//! sim.push_event(InputEvent::PointerDown { x: 120.0, y: 80.0 });
//! sim.push_event(InputEvent::Resize { width: 400, height: 600 });
//! sim.tick(); // both are handled here
//! ```

use glam::Vec2;
use std::collections::VecDeque;

/// An event from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Primary button or touch pressed at canvas coordinates.
    PointerDown { x: f32, y: f32 },
    /// Pointer moved, pressed or not.
    PointerMove { x: f32, y: f32 },
    /// Primary button or touch released.
    PointerUp { x: f32, y: f32 },
    /// The canvas changed size.
    Resize { width: u32, height: u32 },
}

/// A pointer event after [`Input::apply`], with the drag delta resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Pointer {
    Down(Vec2),
    /// Position and movement since the previous pointer event.
    Move { position: Vec2, delta: Vec2, held: bool },
    Up(Vec2),
}

/// Event queue plus pointer state.
#[derive(Debug, Default)]
pub struct Input {
    queue: VecDeque<InputEvent>,
    pointer: Option<Vec2>,
    held: bool,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event for the next tick.
    pub fn push(&mut self, event: InputEvent) {
        self.queue.push_back(event);
    }

    /// Take every queued event, oldest first.
    pub fn drain(&mut self) -> Vec<InputEvent> {
        self.queue.drain(..).collect()
    }

    /// Update pointer state for `event`.
    ///
    /// Returns the resolved pointer event, or `None` for non-pointer events
    /// and non-finite coordinates.
    pub fn apply(&mut self, event: &InputEvent) -> Option<Pointer> {
        let (x, y) = match *event {
            InputEvent::PointerDown { x, y }
            | InputEvent::PointerMove { x, y }
            | InputEvent::PointerUp { x, y } => (x, y),
            InputEvent::Resize { .. } => return None,
        };
        let position = Vec2::new(x, y);
        if !position.is_finite() {
            return None;
        }

        let previous = self.pointer.replace(position);
        Some(match event {
            InputEvent::PointerDown { .. } => {
                self.held = true;
                Pointer::Down(position)
            }
            InputEvent::PointerUp { .. } => {
                self.held = false;
                Pointer::Up(position)
            }
            _ => Pointer::Move {
                position,
                delta: previous.map_or(Vec2::ZERO, |p| position - p),
                held: self.held,
            },
        })
    }

    /// Last known pointer position.
    pub fn pointer(&self) -> Option<Vec2> {
        self.pointer
    }

    /// Whether the primary button is down.
    pub fn is_held(&self) -> bool {
        self.held
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_drains_in_order() {
        let mut input = Input::new();
        input.push(InputEvent::PointerDown { x: 1.0, y: 2.0 });
        input.push(InputEvent::Resize {
            width: 10,
            height: 20,
        });
        let events = input.drain();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], InputEvent::Resize { width: 10, .. }));
        assert!(input.drain().is_empty());
    }

    #[test]
    fn test_drag_delta() {
        let mut input = Input::new();
        assert_eq!(
            input.apply(&InputEvent::PointerDown { x: 10.0, y: 10.0 }),
            Some(Pointer::Down(Vec2::new(10.0, 10.0)))
        );
        assert!(input.is_held());
        let moved = input.apply(&InputEvent::PointerMove { x: 15.0, y: 7.0 });
        assert_eq!(
            moved,
            Some(Pointer::Move {
                position: Vec2::new(15.0, 7.0),
                delta: Vec2::new(5.0, -3.0),
                held: true,
            })
        );
        input.apply(&InputEvent::PointerUp { x: 15.0, y: 7.0 });
        assert!(!input.is_held());
    }

    #[test]
    fn test_non_finite_pointer_ignored() {
        let mut input = Input::new();
        assert_eq!(input.apply(&InputEvent::PointerDown { x: f32::NAN, y: 0.0 }), None);
        assert_eq!(input.pointer(), None);
        assert!(!input.is_held());
    }
}
