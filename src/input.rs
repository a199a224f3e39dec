//! Pointer and keyboard handling.
//!
//! Left drag orbits, right drag pans, the wheel zooms, digits pick a kit
//! variant. Natively a double click inside the window toggles full screen;
//! on the web the page's own `dblclick` event does that instead (see
//! `web.rs`), so the detector is off there.

use instant::{Duration, Instant};
use winit::{
    dpi::PhysicalPosition,
    event::{ElementState, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    keyboard::Key,
};

use crate::{controls::ControlState, viewer::Viewer};

pub const DOUBLE_CLICK_INTERVAL: Duration = Duration::from_millis(500);
/// Maximum distance in pixels between the two clicks of a double click.
pub const DOUBLE_CLICK_DISTANCE: f64 = 5.0;
/// Pixels per scrolled line.
const LINE_HEIGHT: f32 = 100.0;

/// Something the app has to do in response to input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    None,
    ToggleFullscreen,
    SelectVariant(usize),
}

#[derive(Debug)]
pub struct InputState {
    /// `None` while the cursor is outside the window.
    cursor: Option<PhysicalPosition<f64>>,
    drag_from: Option<PhysicalPosition<f64>>,
    last_click: Option<(Instant, PhysicalPosition<f64>)>,
    detect_double_click: bool,
}

impl InputState {
    pub fn new(detect_double_click: bool) -> Self {
        Self {
            cursor: None,
            drag_from: None,
            last_click: None,
            detect_double_click,
        }
    }

    /// Input state for the current target.
    pub fn for_platform() -> Self {
        Self::new(cfg!(not(target_arch = "wasm32")))
    }

    pub fn handle_window_event(
        &mut self,
        event: &WindowEvent,
        viewer: &mut Viewer,
        viewport_height: f32,
    ) -> Action {
        match event {
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_moved(*position, viewer, viewport_height);
                Action::None
            }
            WindowEvent::CursorLeft { .. } => {
                self.cursor_left(viewer);
                Action::None
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => self.press(*button, Instant::now(), viewer),
                ElementState::Released => {
                    self.release(viewer);
                    Action::None
                }
            },
            WindowEvent::MouseWheel { delta, .. } => {
                viewer.controls.zoom(wheel_pixels(delta));
                Action::None
            }
            WindowEvent::KeyboardInput { event, .. } => key_action(event),
            _ => Action::None,
        }
    }

    pub fn cursor_moved(
        &mut self,
        position: PhysicalPosition<f64>,
        viewer: &mut Viewer,
        viewport_height: f32,
    ) {
        self.cursor = Some(position);
        let Some(from) = self.drag_from else {
            return;
        };
        let dx = (position.x - from.x) as f32;
        let dy = (position.y - from.y) as f32;
        match viewer.controls.state() {
            ControlState::Rotate => viewer.controls.rotate_by_drag(dx, dy, viewport_height),
            ControlState::Pan => viewer.controls.pan_by_drag(
                dx,
                dy,
                viewport_height,
                &viewer.camera,
                viewer.projection.fovy.0,
            ),
            ControlState::Idle => {}
        }
        self.drag_from = Some(position);
    }

    pub fn cursor_left(&mut self, viewer: &mut Viewer) {
        self.cursor = None;
        self.last_click = None;
        self.release(viewer);
    }

    /// A button went down at `now`. Presses outside the window are ignored.
    pub fn press(&mut self, button: MouseButton, now: Instant, viewer: &mut Viewer) -> Action {
        let Some(position) = self.cursor else {
            return Action::None;
        };
        match button {
            MouseButton::Left => viewer.controls.begin(ControlState::Rotate),
            MouseButton::Right => viewer.controls.begin(ControlState::Pan),
            _ => return Action::None,
        }
        self.drag_from = Some(position);

        if button != MouseButton::Left || !self.detect_double_click {
            return Action::None;
        }
        if let Some((at, first)) = self.last_click {
            let close = distance(first, position) <= DOUBLE_CLICK_DISTANCE;
            if close && now.duration_since(at) <= DOUBLE_CLICK_INTERVAL {
                self.last_click = None;
                return Action::ToggleFullscreen;
            }
        }
        self.last_click = Some((now, position));
        Action::None
    }

    pub fn release(&mut self, viewer: &mut Viewer) {
        self.drag_from = None;
        viewer.controls.end();
    }
}

/// Wheel movement in pixels, positive when zooming out.
pub fn wheel_pixels(delta: &MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => -y * LINE_HEIGHT,
        MouseScrollDelta::PixelDelta(position) => -position.y as f32,
    }
}

fn key_action(event: &KeyEvent) -> Action {
    if event.state != ElementState::Pressed || event.repeat {
        return Action::None;
    }
    match &event.logical_key {
        Key::Character(text) => digit_action(text),
        _ => Action::None,
    }
}

/// Digits `1..=9` select the variant at position `digit - 1`.
pub fn digit_action(text: &str) -> Action {
    match text.parse::<usize>() {
        Ok(digit @ 1..=9) => Action::SelectVariant(digit - 1),
        _ => Action::None,
    }
}

fn distance(a: PhysicalPosition<f64>, b: PhysicalPosition<f64>) -> f64 {
    ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use crate::config::ViewerConfig;

    use super::*;

    fn setup() -> (InputState, Viewer) {
        (InputState::new(true), Viewer::new(&ViewerConfig::default()))
    }

    fn click(input: &mut InputState, viewer: &mut Viewer, at: Instant) -> Action {
        let action = input.press(MouseButton::Left, at, viewer);
        input.release(viewer);
        action
    }

    #[test]
    fn double_click_inside_toggles() {
        let (mut input, mut viewer) = setup();
        let t0 = Instant::now();
        input.cursor_moved(PhysicalPosition::new(100.0, 100.0), &mut viewer, 600.0);

        assert_eq!(click(&mut input, &mut viewer, t0), Action::None);
        assert_eq!(
            click(&mut input, &mut viewer, t0 + Duration::from_millis(200)),
            Action::ToggleFullscreen
        );
        // A third click starts a new pair
        assert_eq!(
            click(&mut input, &mut viewer, t0 + Duration::from_millis(300)),
            Action::None
        );
    }

    #[test]
    fn double_click_outside_does_nothing() {
        let (mut input, mut viewer) = setup();
        let t0 = Instant::now();
        input.cursor_moved(PhysicalPosition::new(10.0, 10.0), &mut viewer, 600.0);
        input.cursor_left(&mut viewer);

        assert_eq!(click(&mut input, &mut viewer, t0), Action::None);
        assert_eq!(
            click(&mut input, &mut viewer, t0 + Duration::from_millis(100)),
            Action::None
        );
    }

    #[test]
    fn slow_or_distant_clicks_are_single_clicks() {
        let (mut input, mut viewer) = setup();
        let t0 = Instant::now();
        input.cursor_moved(PhysicalPosition::new(100.0, 100.0), &mut viewer, 600.0);
        click(&mut input, &mut viewer, t0);
        assert_eq!(
            click(&mut input, &mut viewer, t0 + Duration::from_millis(800)),
            Action::None
        );

        input.cursor_moved(PhysicalPosition::new(150.0, 100.0), &mut viewer, 600.0);
        assert_eq!(
            click(&mut input, &mut viewer, t0 + Duration::from_millis(900)),
            Action::None
        );
    }

    #[test]
    fn detector_can_be_disabled() {
        let mut input = InputState::new(false);
        let mut viewer = Viewer::new(&ViewerConfig::default());
        let t0 = Instant::now();
        input.cursor_moved(PhysicalPosition::new(1.0, 1.0), &mut viewer, 600.0);
        click(&mut input, &mut viewer, t0);
        assert_eq!(click(&mut input, &mut viewer, t0), Action::None);
    }

    #[test]
    fn buttons_start_and_end_drags() {
        let (mut input, mut viewer) = setup();
        input.cursor_moved(PhysicalPosition::new(1.0, 1.0), &mut viewer, 600.0);

        input.press(MouseButton::Right, Instant::now(), &mut viewer);
        assert_eq!(viewer.controls.state(), ControlState::Pan);
        input.release(&mut viewer);
        assert_eq!(viewer.controls.state(), ControlState::Idle);

        input.press(MouseButton::Left, Instant::now(), &mut viewer);
        assert_eq!(viewer.controls.state(), ControlState::Rotate);
        input.cursor_left(&mut viewer);
        assert_eq!(viewer.controls.state(), ControlState::Idle);
    }

    #[test]
    fn digits_map_to_variant_positions() {
        assert_eq!(digit_action("1"), Action::SelectVariant(0));
        assert_eq!(digit_action("9"), Action::SelectVariant(8));
        assert_eq!(digit_action("0"), Action::None);
        assert_eq!(digit_action("a"), Action::None);
    }

    #[test]
    fn wheel_lines_scale_to_pixels() {
        assert_eq!(wheel_pixels(&MouseScrollDelta::LineDelta(0.0, 1.0)), -100.0);
        assert_eq!(
            wheel_pixels(&MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, -30.0))),
            30.0
        );
    }
}
