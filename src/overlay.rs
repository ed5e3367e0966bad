use anyhow::Result;

use crate::surface::{CapabilityError, Dimension, DisplaySurface, FocusPolicy, SurfaceConfig};

/// Net displacement (in both axes) below which a touch sequence counts as a
/// tap rather than a drag.
pub const TAP_THRESHOLD: i32 = 10;

/// Expanded window width as a fraction of the display width.
pub const EXPANDED_WIDTH_FRACTION: f32 = 0.3;

/// Fixed expanded window height in cells.
pub const EXPANDED_HEIGHT: u16 = 20;

const INITIAL_X: i32 = 0;
const INITIAL_Y: i32 = 4;

/// What a completed touch sequence amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchOutcome {
    Tap,
    Drag,
}

/// Live geometry and focus of the floating widget. `expanded` selects which
/// of the two canonical configurations the surface is snapped to; `x`/`y`
/// track the last drag offset across transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    pub x: i32,
    pub y: i32,
    pub expanded: bool,
}

/// Offsets recorded at touch-down, against which every move is computed.
#[derive(Debug, Clone, Copy)]
struct DragBaseline {
    origin_x: i32,
    origin_y: i32,
    touch_x: i32,
    touch_y: i32,
}

/// Owns the single floating surface: position during drag, the
/// collapsed/expanded transition, focus policy, and the attach/detach
/// lifecycle against the display layer.
pub struct OverlayController<S: DisplaySurface> {
    surface: S,
    state: WindowState,
    attached: bool,
    drag: Option<DragBaseline>,
    text_entry_focus: bool,
}

impl<S: DisplaySurface> OverlayController<S> {
    pub fn new(surface: S) -> Self {
        Self {
            surface,
            state: WindowState { x: INITIAL_X, y: INITIAL_Y, expanded: false },
            attached: false,
            drag: None,
            text_entry_focus: false,
        }
    }

    /// Attach the surface to the display layer in the collapsed
    /// configuration. Capability denial leaves the controller unattached;
    /// nothing is half-created.
    pub fn attach(&mut self) -> std::result::Result<(), CapabilityError> {
        let config = self.config();
        self.surface.attach(&config)?;
        self.attached = true;
        Ok(())
    }

    /// Remove the surface from the display layer. Idempotent: the surface is
    /// removed exactly once, and never when attach did not succeed.
    pub fn detach(&mut self) -> Result<()> {
        if !self.attached {
            return Ok(());
        }
        self.attached = false;
        self.surface.detach()
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn state(&self) -> WindowState {
        self.state
    }

    pub fn is_expanded(&self) -> bool {
        self.state.expanded
    }

    /// The canonical configuration for the current state.
    pub fn config(&self) -> SurfaceConfig {
        if self.state.expanded {
            let (display_width, _) = self.surface.display_size();
            let width = (display_width as f32 * EXPANDED_WIDTH_FRACTION) as u16;
            SurfaceConfig {
                x: self.state.x,
                y: self.state.y,
                width: Dimension::Cells(width.max(1)),
                height: Dimension::Cells(EXPANDED_HEIGHT),
                focus: if self.text_entry_focus {
                    FocusPolicy::TextEntry
                } else {
                    FocusPolicy::Interactive
                },
            }
        } else {
            SurfaceConfig {
                x: self.state.x,
                y: self.state.y,
                width: Dimension::Natural,
                height: Dimension::Natural,
                focus: FocusPolicy::PassThrough,
            }
        }
    }

    /// Record the drag baseline: surface offset plus raw touch coordinates.
    pub fn touch_down(&mut self, touch_x: i32, touch_y: i32) {
        self.drag = Some(DragBaseline {
            origin_x: self.state.x,
            origin_y: self.state.y,
            touch_x,
            touch_y,
        });
    }

    /// Recompute the offset from the baseline and re-apply it to the live
    /// surface immediately.
    pub fn touch_move(&mut self, touch_x: i32, touch_y: i32) -> Result<()> {
        if let Some(baseline) = self.drag {
            self.state.x = baseline.origin_x + (touch_x - baseline.touch_x);
            self.state.y = baseline.origin_y + (touch_y - baseline.touch_y);
            self.apply()?;
        }
        Ok(())
    }

    /// End the touch sequence. Below-threshold displacement in both axes is
    /// a tap, which expands a collapsed widget (and is a no-op while
    /// expanded); anything else leaves the committed drag position as-is.
    pub fn touch_up(&mut self, touch_x: i32, touch_y: i32) -> Result<Option<TouchOutcome>> {
        let Some(baseline) = self.drag.take() else {
            return Ok(None);
        };

        let dx = (touch_x - baseline.touch_x).abs();
        let dy = (touch_y - baseline.touch_y).abs();

        if dx < TAP_THRESHOLD && dy < TAP_THRESHOLD {
            if !self.state.expanded {
                self.expand()?;
            }
            Ok(Some(TouchOutcome::Tap))
        } else {
            Ok(Some(TouchOutcome::Drag))
        }
    }

    /// Snap to the expanded configuration: fixed fraction of the display
    /// width, fixed height, focusable for text input.
    pub fn expand(&mut self) -> Result<()> {
        self.state.expanded = true;
        self.apply()
    }

    /// Snap back to the collapsed configuration: natural size at the last
    /// drag offset, touches pass through.
    pub fn collapse(&mut self) -> Result<()> {
        self.state.expanded = false;
        self.text_entry_focus = false;
        self.apply()
    }

    /// Escalate or release the text-entry focus variant. Only meaningful
    /// while expanded; the collapsed surface is never focusable.
    pub fn set_text_entry_focus(&mut self, focused: bool) -> Result<()> {
        if !self.state.expanded || self.text_entry_focus == focused {
            return Ok(());
        }
        self.text_entry_focus = focused;
        self.apply()
    }

    fn apply(&mut self) -> Result<()> {
        let config = self.config();
        self.surface.update(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum SurfaceCall {
        Attach,
        Update,
        Detach,
    }

    #[derive(Default)]
    struct Recording {
        calls: Vec<SurfaceCall>,
        configs: Vec<SurfaceConfig>,
    }

    struct MockSurface {
        record: Rc<RefCell<Recording>>,
        deny_attach: bool,
    }

    impl MockSurface {
        fn new() -> (Self, Rc<RefCell<Recording>>) {
            let record = Rc::new(RefCell::new(Recording::default()));
            (Self { record: record.clone(), deny_attach: false }, record)
        }

        fn denying() -> (Self, Rc<RefCell<Recording>>) {
            let record = Rc::new(RefCell::new(Recording::default()));
            (Self { record: record.clone(), deny_attach: true }, record)
        }
    }

    impl DisplaySurface for MockSurface {
        fn attach(&mut self, config: &SurfaceConfig) -> std::result::Result<(), CapabilityError> {
            if self.deny_attach {
                return Err(CapabilityError::Denied("no overlay permission".to_string()));
            }
            let mut r = self.record.borrow_mut();
            r.calls.push(SurfaceCall::Attach);
            r.configs.push(*config);
            Ok(())
        }

        fn update(&mut self, config: &SurfaceConfig) -> Result<()> {
            let mut r = self.record.borrow_mut();
            r.calls.push(SurfaceCall::Update);
            r.configs.push(*config);
            Ok(())
        }

        fn detach(&mut self) -> Result<()> {
            self.record.borrow_mut().calls.push(SurfaceCall::Detach);
            Ok(())
        }

        fn display_size(&self) -> (u16, u16) {
            (100, 40)
        }
    }

    fn attached_controller() -> (OverlayController<MockSurface>, Rc<RefCell<Recording>>) {
        let (surface, record) = MockSurface::new();
        let mut controller = OverlayController::new(surface);
        controller.attach().unwrap();
        (controller, record)
    }

    #[test]
    fn attaches_collapsed_and_pass_through() {
        let (controller, record) = attached_controller();
        assert!(controller.is_attached());
        assert!(!controller.is_expanded());

        let record = record.borrow();
        assert_eq!(record.calls, vec![SurfaceCall::Attach]);
        let config = record.configs[0];
        assert_eq!(config.width, Dimension::Natural);
        assert_eq!(config.focus, FocusPolicy::PassThrough);
    }

    #[test]
    fn capability_denial_fails_attach_and_blocks_detach() {
        let (surface, record) = MockSurface::denying();
        let mut controller = OverlayController::new(surface);
        assert!(matches!(controller.attach(), Err(CapabilityError::Denied(_))));
        assert!(!controller.is_attached());

        // Detach must not reach the surface when attach never succeeded.
        controller.detach().unwrap();
        assert!(record.borrow().calls.is_empty());
    }

    #[test]
    fn tap_below_threshold_expands() {
        let (mut controller, record) = attached_controller();

        controller.touch_down(50, 20);
        controller.touch_move(55, 24).unwrap();
        let outcome = controller.touch_up(55, 24).unwrap();

        assert_eq!(outcome, Some(TouchOutcome::Tap));
        assert!(controller.is_expanded());

        // The final applied config is the expanded one: 30% of a 100-cell
        // display, fixed height, focusable.
        let record = record.borrow();
        let config = record.configs.last().unwrap();
        assert_eq!(config.width, Dimension::Cells(30));
        assert_eq!(config.height, Dimension::Cells(EXPANDED_HEIGHT));
        assert_eq!(config.focus, FocusPolicy::Interactive);
    }

    #[test]
    fn drag_at_threshold_moves_without_expanding() {
        let (mut controller, _) = attached_controller();
        let start = controller.state();

        controller.touch_down(50, 20);
        controller.touch_move(60, 20).unwrap();
        let outcome = controller.touch_up(60, 20).unwrap();

        assert_eq!(outcome, Some(TouchOutcome::Drag));
        assert!(!controller.is_expanded());
        assert_eq!(controller.state().x, start.x + 10);
        assert_eq!(controller.state().y, start.y);
    }

    #[test]
    fn drag_applies_every_move_to_the_surface() {
        let (mut controller, record) = attached_controller();

        controller.touch_down(10, 10);
        controller.touch_move(30, 15).unwrap();
        controller.touch_move(40, 25).unwrap();
        controller.touch_up(40, 25).unwrap();

        let record = record.borrow();
        let updates: Vec<_> = record
            .calls
            .iter()
            .filter(|c| **c == SurfaceCall::Update)
            .collect();
        assert_eq!(updates.len(), 2);

        // offset = baseline offset + (raw - baseline raw)
        assert_eq!(record.configs[1].x, INITIAL_X + 20);
        assert_eq!(record.configs[1].y, INITIAL_Y + 5);
        assert_eq!(record.configs[2].x, INITIAL_X + 30);
        assert_eq!(record.configs[2].y, INITIAL_Y + 15);
    }

    #[test]
    fn tap_while_expanded_is_a_no_op() {
        let (mut controller, record) = attached_controller();
        controller.expand().unwrap();
        let updates_before = record.borrow().calls.len();

        controller.touch_down(50, 20);
        let outcome = controller.touch_up(51, 21).unwrap();

        assert_eq!(outcome, Some(TouchOutcome::Tap));
        assert!(controller.is_expanded());
        // No config re-application happened for the redundant tap.
        assert_eq!(record.borrow().calls.len(), updates_before);
    }

    #[test]
    fn close_collapses_back_to_natural_size() {
        let (mut controller, record) = attached_controller();
        controller.expand().unwrap();
        controller.collapse().unwrap();

        assert!(!controller.is_expanded());
        let record = record.borrow();
        let config = record.configs.last().unwrap();
        assert_eq!(config.width, Dimension::Natural);
        assert_eq!(config.height, Dimension::Natural);
        assert_eq!(config.focus, FocusPolicy::PassThrough);
    }

    #[test]
    fn collapse_keeps_the_last_drag_offset() {
        let (mut controller, _) = attached_controller();

        controller.touch_down(0, 0);
        controller.touch_move(25, 12).unwrap();
        controller.touch_up(25, 12).unwrap();
        controller.expand().unwrap();
        controller.collapse().unwrap();

        assert_eq!(controller.state().x, INITIAL_X + 25);
        assert_eq!(controller.state().y, INITIAL_Y + 12);
    }

    #[test]
    fn text_entry_focus_escalates_only_while_expanded() {
        let (mut controller, record) = attached_controller();

        // Collapsed: never focusable.
        controller.set_text_entry_focus(true).unwrap();
        assert_eq!(controller.config().focus, FocusPolicy::PassThrough);

        controller.expand().unwrap();
        controller.set_text_entry_focus(true).unwrap();
        assert_eq!(controller.config().focus, FocusPolicy::TextEntry);

        // Collapsing releases the text-entry focus with it.
        controller.collapse().unwrap();
        controller.expand().unwrap();
        assert_eq!(controller.config().focus, FocusPolicy::Interactive);

        let record = record.borrow();
        assert!(record.configs.iter().any(|c| c.focus == FocusPolicy::TextEntry));
    }

    #[test]
    fn detach_removes_the_surface_exactly_once() {
        let (mut controller, record) = attached_controller();

        controller.detach().unwrap();
        controller.detach().unwrap();

        let record = record.borrow();
        let detaches = record.calls.iter().filter(|c| **c == SurfaceCall::Detach).count();
        assert_eq!(detaches, 1);
    }
}
