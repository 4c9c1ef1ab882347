/// Pointer math and drag tracking for the before/after slider
///
/// Kept free of widget types so the geometry can be tested directly.

/// Slider position for a fresh comparison
pub const DEFAULT_PERCENT: f32 = 50.0;

/// Half-width, in logical pixels, of the zone around the divider that
/// starts a drag
pub const GRAB_RADIUS: f32 = 18.0;

/// Percentage of the container left of `pointer_x`, clamped to [0, 100].
///
/// Returns `None` for a container without width (not laid out yet).
pub fn percent_at(pointer_x: f32, container_left: f32, container_width: f32) -> Option<f32> {
    if container_width <= 0.0 || !container_width.is_finite() || !pointer_x.is_finite() {
        return None;
    }
    let percent = (pointer_x - container_left) / container_width * 100.0;
    Some(percent.clamp(0.0, 100.0))
}

/// Horizontal position of the divider for `percent`
pub fn divider_x(container_left: f32, container_width: f32, percent: f32) -> f32 {
    container_left + container_width * percent / 100.0
}

/// Whether `pointer_x` is close enough to the divider to grab it
pub fn on_divider(pointer_x: f32, container_left: f32, container_width: f32, percent: f32) -> bool {
    (pointer_x - divider_x(container_left, container_width, percent)).abs() <= GRAB_RADIUS
}

/// The input that owns a drag gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pointer {
    Mouse,
    Finger(u64),
}

/// Tracks the single active drag gesture.
///
/// Move events are only turned into positions while a gesture is active,
/// and only for the pointer that started it. Any release of that pointer
/// ends the gesture, wherever it happens.
#[derive(Debug, Clone, Default)]
pub struct DragTracker {
    active: Option<Pointer>,
}

impl DragTracker {
    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Start a gesture. Fails while another pointer is dragging.
    pub fn begin(&mut self, pointer: Pointer) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(pointer);
        true
    }

    /// New slider position for a move of `pointer`, if it owns the gesture.
    pub fn track(
        &self,
        pointer: Pointer,
        pointer_x: f32,
        container_left: f32,
        container_width: f32,
    ) -> Option<f32> {
        if self.active != Some(pointer) {
            return None;
        }
        percent_at(pointer_x, container_left, container_width)
    }

    /// End the gesture if `pointer` owns it.
    pub fn end(&mut self, pointer: Pointer) -> bool {
        if self.active == Some(pointer) {
            self.active = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 0.001;

    #[test]
    fn test_edges_and_midpoint() {
        let (left, width) = (120.0, 800.0);
        assert!((percent_at(left, left, width).unwrap() - 0.0).abs() < EPSILON);
        assert!((percent_at(left + width, left, width).unwrap() - 100.0).abs() < EPSILON);
        assert!((percent_at(left + width / 2.0, left, width).unwrap() - 50.0).abs() < EPSILON);
    }

    #[test]
    fn test_outside_container_is_clamped() {
        assert_eq!(percent_at(-500.0, 100.0, 400.0), Some(0.0));
        assert_eq!(percent_at(5000.0, 100.0, 400.0), Some(100.0));
    }

    #[test]
    fn test_zero_width_container() {
        assert_eq!(percent_at(10.0, 0.0, 0.0), None);
        assert_eq!(percent_at(f32::NAN, 0.0, 100.0), None);
    }

    #[test]
    fn test_grab_zone() {
        assert!(on_divider(250.0, 0.0, 500.0, 50.0));
        assert!(on_divider(250.0 + GRAB_RADIUS, 0.0, 500.0, 50.0));
        assert!(!on_divider(100.0, 0.0, 500.0, 50.0));
    }

    #[test]
    fn test_moves_ignored_without_gesture() {
        let tracker = DragTracker::default();
        assert_eq!(tracker.track(Pointer::Mouse, 50.0, 0.0, 100.0), None);
    }

    #[test]
    fn test_gesture_lifecycle() {
        let mut tracker = DragTracker::default();
        assert!(tracker.begin(Pointer::Mouse));
        assert!(tracker.is_dragging());
        assert_eq!(tracker.track(Pointer::Mouse, 25.0, 0.0, 100.0), Some(25.0));

        // Pointer left the container during a fast drag
        assert_eq!(tracker.track(Pointer::Mouse, 900.0, 0.0, 100.0), Some(100.0));

        assert!(tracker.end(Pointer::Mouse));
        assert!(!tracker.is_dragging());
        assert_eq!(tracker.track(Pointer::Mouse, 25.0, 0.0, 100.0), None);
    }

    #[test]
    fn test_single_owner() {
        let mut tracker = DragTracker::default();
        assert!(tracker.begin(Pointer::Finger(1)));
        assert!(!tracker.begin(Pointer::Mouse));
        assert!(!tracker.begin(Pointer::Finger(2)));

        assert_eq!(tracker.track(Pointer::Finger(2), 10.0, 0.0, 100.0), None);
        assert_eq!(tracker.track(Pointer::Finger(1), 10.0, 0.0, 100.0), Some(10.0));

        assert!(!tracker.end(Pointer::Finger(2)));
        assert!(tracker.end(Pointer::Finger(1)));
    }
}
