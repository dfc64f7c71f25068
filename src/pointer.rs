//! Pointer and touch state shared between input handlers and frames.

use cgmath::Vector2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    MouseMove { x: f32, y: f32 },
    MouseLeave,
    TouchStart,
    TouchMove { x: f32, y: f32 },
    TouchEnd,
    Click,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputResponse {
    /// Suppress the default action, i.e. page scrolling while dragging.
    pub suppress_default: bool,
    /// The activation callback ran for this event.
    pub activated: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PointerState {
    /// `None` is the off-canvas sentinel: nothing is disturbed.
    position: Option<Vector2<f32>>,
    touching: bool,
    touch_device: bool,
}

impl PointerState {
    pub fn apply(&mut self, event: PointerEvent) -> InputResponse {
        match event {
            PointerEvent::MouseMove { x, y } => {
                self.position = Some(Vector2::new(x, y));
            }
            PointerEvent::MouseLeave => {
                if !self.touch_device {
                    self.position = None;
                }
            }
            PointerEvent::TouchStart => {
                self.touch_device = true;
                self.touching = true;
            }
            PointerEvent::TouchMove { x, y } => {
                self.touch_device = true;
                self.position = Some(Vector2::new(x, y));
                return InputResponse {
                    suppress_default: true,
                    ..InputResponse::default()
                };
            }
            PointerEvent::TouchEnd => {
                self.touch_device = true;
                self.touching = false;
                self.position = None;
            }
            PointerEvent::Click => {}
        }
        InputResponse::default()
    }

    pub fn position(&self) -> Option<Vector2<f32>> {
        self.position
    }

    pub fn is_touching(&self) -> bool {
        self.touching
    }

    /// The point particles should react to this frame, if any.
    ///
    /// Mice interact whenever they are over the canvas; touch devices only
    /// while a finger is down.
    pub fn active_position(&self) -> Option<Vector2<f32>> {
        if self.touching || !self.touch_device {
            self.position
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mouse_is_active_until_it_leaves() {
        let mut pointer = PointerState::default();
        assert_eq!(pointer.active_position(), None);
        pointer.apply(PointerEvent::MouseMove { x: 3.0, y: 4.0 });
        assert_eq!(pointer.active_position(), Some(Vector2::new(3.0, 4.0)));
        pointer.apply(PointerEvent::MouseLeave);
        assert_eq!(pointer.active_position(), None);
    }

    #[test]
    fn touch_move_suppresses_scroll_and_end_resets() {
        let mut pointer = PointerState::default();
        pointer.apply(PointerEvent::TouchStart);
        let response = pointer.apply(PointerEvent::TouchMove { x: 10.0, y: 10.0 });
        assert!(response.suppress_default);
        assert!(pointer.is_touching());
        assert_eq!(pointer.active_position(), Some(Vector2::new(10.0, 10.0)));

        pointer.apply(PointerEvent::TouchEnd);
        assert!(!pointer.is_touching());
        assert_eq!(pointer.position(), None);
        assert_eq!(pointer.active_position(), None);
    }

    #[test]
    fn touch_devices_ignore_hover_without_a_finger_down() {
        let mut pointer = PointerState::default();
        pointer.apply(PointerEvent::TouchStart);
        pointer.apply(PointerEvent::TouchEnd);
        // Emulated mouse events on touch screens must not disturb particles.
        pointer.apply(PointerEvent::MouseMove { x: 5.0, y: 5.0 });
        assert_eq!(pointer.active_position(), None);
        // And mouse-leave does not clear the coordinate there.
        pointer.apply(PointerEvent::MouseLeave);
        assert_eq!(pointer.position(), Some(Vector2::new(5.0, 5.0)));
    }
}
