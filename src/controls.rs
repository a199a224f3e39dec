//! Orbit camera controller.
//!
//! The camera circles a target on a sphere. Input only accumulates deltas
//! (rotation, dolly scale, pan offset); [`OrbitControls::update`] applies
//! them once per frame. With damping enabled only a fraction of each delta
//! is applied per update and the rest decays, which gives the drag its
//! inertia.

use std::f32::consts::{PI, TAU};

use cgmath::{EuclideanSpace, InnerSpace, Point3, Vector3, Zero};
use instant::Duration;

use crate::camera::Camera;

const EPS: f32 = 1e-6;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ControlState {
    #[default]
    Idle,
    Rotate,
    Pan,
}

/// Tunables of [`OrbitControls`].
#[derive(Clone, Debug, PartialEq)]
pub struct OrbitSettings {
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub auto_rotate: bool,
    /// Full turns per minute at 60 fps, i.e. 2.0 orbits once every 30 seconds.
    pub auto_rotate_speed: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            auto_rotate: true,
            auto_rotate_speed: 2.0,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
        }
    }
}

/// Angles of an offset from the target: `theta` around +Y starting at +Z,
/// `phi` down from +Y.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct Spherical {
    radius: f32,
    theta: f32,
    phi: f32,
}

impl Spherical {
    fn from_offset(offset: Vector3<f32>) -> Self {
        let radius = offset.magnitude();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: offset.x.atan2(offset.z),
            phi: (offset.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    fn to_offset(self) -> Vector3<f32> {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vector3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }
}

#[derive(Clone, Debug)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub settings: OrbitSettings,
    state: ControlState,
    spherical_delta: Spherical,
    scale: f32,
    pan_offset: Vector3<f32>,
}

impl OrbitControls {
    pub fn new(settings: OrbitSettings) -> Self {
        Self {
            target: Point3::origin(),
            settings,
            state: ControlState::Idle,
            spherical_delta: Spherical::default(),
            scale: 1.0,
            pan_offset: Vector3::zero(),
        }
    }

    pub fn state(&self) -> ControlState {
        self.state
    }

    pub fn begin(&mut self, state: ControlState) {
        self.state = state;
    }

    pub fn end(&mut self) {
        self.state = ControlState::Idle;
    }

    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    /// Pointer drag in pixels while rotating; a drag across the full
    /// viewport height turns the camera once around the target.
    pub fn rotate_by_drag(&mut self, dx: f32, dy: f32, viewport_height: f32) {
        let height = viewport_height.max(1.0);
        self.rotate_left(TAU * dx / height * self.settings.rotate_speed);
        self.rotate_up(TAU * dy / height * self.settings.rotate_speed);
    }

    /// Pointer drag in pixels while panning; the target follows the cursor
    /// at the depth of the target.
    pub fn pan_by_drag(&mut self, dx: f32, dy: f32, viewport_height: f32, camera: &Camera, fovy: f32) {
        let height = viewport_height.max(1.0);
        let target_distance = camera.distance_to_target() * (fovy / 2.0).tan();
        let (right, up) = camera.screen_axes();
        let speed = self.settings.pan_speed;
        self.pan_offset -= right * (2.0 * dx * target_distance / height * speed);
        self.pan_offset += up * (2.0 * dy * target_distance / height * speed);
    }

    /// Wheel movement in pixels, positive when scrolling away from the user
    /// (which moves the camera away from the target).
    pub fn zoom(&mut self, delta_y: f32) {
        if delta_y == 0.0 {
            return;
        }
        let zoom_scale = 0.95_f32.powf(self.settings.zoom_speed * (delta_y * 0.01).abs());
        if delta_y < 0.0 {
            self.scale *= zoom_scale;
        } else {
            self.scale /= zoom_scale;
        }
    }

    fn auto_rotation_angle(&self, dt: Option<Duration>) -> f32 {
        match dt {
            Some(dt) => TAU / 60.0 * self.settings.auto_rotate_speed * dt.as_secs_f32(),
            None => TAU / 60.0 / 60.0 * self.settings.auto_rotate_speed,
        }
    }

    /// Applies the accumulated input to `camera`, which ends up looking at
    /// the target. Returns whether the camera moved noticeably.
    pub fn update(&mut self, camera: &mut Camera, dt: Option<Duration>) -> bool {
        let previous = camera.position;
        let mut spherical = Spherical::from_offset(camera.position - self.target);

        if self.settings.auto_rotate && self.state == ControlState::Idle {
            let angle = self.auto_rotation_angle(dt);
            self.rotate_left(angle);
        }

        let damping = self.settings.damping_factor.clamp(0.0, 1.0);
        if self.settings.enable_damping {
            spherical.theta += self.spherical_delta.theta * damping;
            spherical.phi += self.spherical_delta.phi * damping;
        } else {
            spherical.theta += self.spherical_delta.theta;
            spherical.phi += self.spherical_delta.phi;
        }

        spherical.phi = spherical
            .phi
            .clamp(self.settings.min_polar_angle, self.settings.max_polar_angle)
            .clamp(EPS, PI - EPS);

        spherical.radius = (spherical.radius * self.scale)
            .clamp(self.settings.min_distance, self.settings.max_distance);

        if self.settings.enable_damping {
            self.target += self.pan_offset * damping;
        } else {
            self.target += self.pan_offset;
        }

        camera.position = self.target + spherical.to_offset();
        camera.target = self.target;

        if self.settings.enable_damping {
            self.spherical_delta.theta *= 1.0 - damping;
            self.spherical_delta.phi *= 1.0 - damping;
            self.pan_offset *= 1.0 - damping;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vector3::zero();
        }
        self.scale = 1.0;

        (camera.position - previous).magnitude2() > EPS
    }
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self::new(OrbitSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use cgmath::MetricSpace;

    use super::*;

    fn still() -> OrbitSettings {
        OrbitSettings {
            enable_damping: false,
            auto_rotate: false,
            ..Default::default()
        }
    }

    fn camera() -> Camera {
        Camera::new(Point3::new(1.0, 1.0, 2.0), Point3::origin())
    }

    #[test]
    fn update_without_input_keeps_camera_in_place() {
        let mut controls = OrbitControls::new(still());
        let mut camera = camera();

        let moved = controls.update(&mut camera, None);

        assert!(!moved);
        assert!(camera.position.distance(Point3::new(1.0, 1.0, 2.0)) < 1e-5);
        assert_eq!(camera.target, Point3::origin());
    }

    #[test]
    fn auto_rotation_keeps_distance_and_height() {
        let mut controls = OrbitControls::new(OrbitSettings {
            enable_damping: false,
            ..Default::default()
        });
        let mut camera = camera();
        let distance = camera.distance_to_target();

        for _ in 0..30 {
            assert!(controls.update(&mut camera, Some(Duration::from_millis(16))));
        }

        assert!((camera.distance_to_target() - distance).abs() < 1e-4);
        assert!((camera.position.y - 1.0).abs() < 1e-4);
        assert!(camera.position.distance(Point3::new(1.0, 1.0, 2.0)) > 1e-3);
    }

    #[test]
    fn auto_rotation_pauses_while_dragging() {
        let mut controls = OrbitControls::new(OrbitSettings {
            enable_damping: false,
            ..Default::default()
        });
        let mut camera = camera();
        controls.begin(ControlState::Rotate);

        assert!(!controls.update(&mut camera, Some(Duration::from_millis(16))));
    }

    #[test]
    fn retargeting_moves_camera_to_look_at_new_target() {
        let mut controls = OrbitControls::new(still());
        let mut camera = camera();
        controls.target = Point3::new(0.0, 0.65, 0.0);

        controls.update(&mut camera, None);

        assert_eq!(camera.target, Point3::new(0.0, 0.65, 0.0));
        assert!(camera.position.distance(Point3::new(1.0, 1.0, 2.0)) < 1e-5);
    }

    #[test]
    fn zoom_changes_distance_and_respects_limits() {
        let mut controls = OrbitControls::new(OrbitSettings {
            min_distance: 1.0,
            max_distance: 5.0,
            ..still()
        });
        let mut camera = camera();
        let start = camera.distance_to_target();

        controls.zoom(-100.0);
        controls.update(&mut camera, None);
        let closer = camera.distance_to_target();
        assert!((closer - start * 0.95).abs() < 1e-4);

        for _ in 0..200 {
            controls.zoom(-1000.0);
            controls.update(&mut camera, None);
        }
        assert!((camera.distance_to_target() - 1.0).abs() < 1e-4);

        for _ in 0..200 {
            controls.zoom(1000.0);
            controls.update(&mut camera, None);
        }
        assert!((camera.distance_to_target() - 5.0).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_never_reaches_the_pole() {
        let mut controls = OrbitControls::new(still());
        let mut camera = camera();

        controls.rotate_up(10.0);
        controls.update(&mut camera, None);

        let offset = camera.position - camera.target;
        let horizontal = (offset.x * offset.x + offset.z * offset.z).sqrt();
        assert!(horizontal > 0.0);
        assert!(offset.y > 0.0);
    }

    #[test]
    fn damping_spreads_a_drag_over_several_frames() {
        let mut controls = OrbitControls::new(OrbitSettings {
            auto_rotate: false,
            ..Default::default()
        });
        let mut camera = camera();
        controls.rotate_by_drag(100.0, 0.0, 600.0);

        let first = camera;
        controls.update(&mut camera, None);
        let step_one = camera.position.distance(first.position);
        let second = camera;
        controls.update(&mut camera, None);
        let step_two = camera.position.distance(second.position);

        assert!(step_one > 0.0);
        assert!(step_two > 0.0);
        assert!(step_two < step_one);
    }

    #[test]
    fn pan_moves_target_and_camera_together() {
        let mut controls = OrbitControls::new(still());
        let mut camera = camera();
        let offset_before = camera.position - camera.target;
        let fovy = 50.0_f32.to_radians();

        controls.pan_by_drag(50.0, 0.0, 600.0, &camera, fovy);
        controls.update(&mut camera, None);

        let offset_after = camera.position - camera.target;
        assert!((offset_after - offset_before).magnitude() < 1e-4);
        assert!(camera.target.distance(Point3::origin()) > 1e-3);
        // Dragging right moves the scene right, i.e. the target left.
        let (right, _) = Camera::new(Point3::new(1.0, 1.0, 2.0), Point3::origin()).screen_axes();
        assert!(camera.target.to_vec().dot(right) < 0.0);
    }
}
