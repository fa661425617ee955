//! # Camera: Fly Camera and Active-Camera Tracking
//!
//! A [`Camera`] component stores position and yaw/pitch in degrees. The
//! facing vector is derived from the angles:
//!
//! ```text
//! front = normalize( cos(pitch)·sin(yaw),  sin(pitch),  -cos(pitch)·cos(yaw) )
//!
//!   yaw   0° → looking down -Z
//!   yaw  90° → looking down +X
//!   pitch is clamped to ±89.9° so front never lines up with `up`
//! ```
//!
//! The [`CameraSystem`] remembers which entity is the active camera. Creating
//! a new camera replaces the reference; the old camera entity is left alone.
//! Each frame, while mouse look is enabled, mouse motion rotates the active
//! camera and the movement actions fly it around.

use crate::config::CameraDefaults;
use crate::ecs::{ComponentStore, Dependency, Entity, System};
use crate::input::{Action, InputSystem};
use crate::math::{Mat4, Vec3};

/// Largest pitch magnitude in degrees.
pub const PITCH_LIMIT: f32 = 89.9;

/// A perspective fly camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Degrees, kept in `[0, 360)` by rotation.
    pub yaw: f32,
    /// Degrees, clamped to `±PITCH_LIMIT` by rotation.
    pub pitch: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    /// Derived from yaw/pitch by [`update_front`](Self::update_front).
    pub front: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
    pub smooth_factor: f32,
}

impl Camera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32, fov: f32) -> Self {
        let mut camera = Self {
            position,
            yaw,
            pitch,
            fov,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            aspect: 16.0 / 9.0,
            near: 0.0,
            far: 0.0,
            move_speed: 0.0,
            mouse_sensitivity: 0.0,
            smooth_factor: 1.0,
        }
        .with_settings(&CameraDefaults::default());
        camera.update_front();
        camera
    }

    /// Copy speed, sensitivity and clip planes from `settings`.
    pub fn with_settings(mut self, settings: &CameraDefaults) -> Self {
        self.move_speed = settings.move_speed;
        self.mouse_sensitivity = settings.mouse_sensitivity;
        self.smooth_factor = settings.smooth_factor;
        self.near = settings.near;
        self.far = settings.far;
        self
    }

    /// Recompute `front` from yaw and pitch.
    pub fn update_front(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(
            pitch.cos() * yaw.sin(),
            pitch.sin(),
            -pitch.cos() * yaw.cos(),
        )
            .normalize();
    }

    /// Apply mouse motion. Moving the mouse up (negative `dy`) pitches up.
    pub fn rotate(&mut self, dx: f32, dy: f32) {
        let scale = self.mouse_sensitivity / self.smooth_factor;
        self.yaw = (self.yaw + dx * scale).rem_euclid(360.0);
        self.pitch = (self.pitch - dy * scale).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Move along the ground plane (relative to yaw) and vertically.
    pub fn fly(&mut self, input: &InputSystem, dt: f32) {
        let velocity = self.move_speed * dt;
        let (sin, cos) = (-self.yaw).to_radians().sin_cos();

        if input.action_pressed(Action::MoveForward) {
            self.position.z -= cos * velocity;
            self.position.x -= sin * velocity;
        }
        if input.action_pressed(Action::MoveBackward) {
            self.position.z += cos * velocity;
            self.position.x += sin * velocity;
        }
        if input.action_pressed(Action::MoveLeft) {
            self.position.z += sin * velocity;
            self.position.x -= cos * velocity;
        }
        if input.action_pressed(Action::MoveRight) {
            self.position.z -= sin * velocity;
            self.position.x += cos * velocity;
        }
        if input.action_pressed(Action::MoveUp) {
            self.position.y += velocity;
        }
        if input.action_pressed(Action::MoveDown) {
            self.position.y -= velocity;
        }
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov.to_radians(), self.aspect, self.near, self.far)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 0.0, 0.0, 90.0)
    }
}

/// Drives the active camera.
#[derive(Debug, Clone)]
pub struct CameraSystem {
    active: Option<Entity>,
    settings: CameraDefaults,
    aspect: f32,
}

impl System for CameraSystem {
    fn dependencies() -> Vec<Dependency> {
        vec![Dependency::of::<InputSystem>()]
    }
}

impl CameraSystem {
    pub fn new(settings: CameraDefaults, aspect: f32) -> Self {
        Self {
            active: None,
            settings,
            aspect,
        }
    }

    /// A camera component configured with this system's settings and the
    /// current viewport aspect.
    pub fn build_camera(&self, position: Vec3, yaw: f32, pitch: f32, fov: f32) -> Camera {
        let mut camera = Camera::new(position, yaw, pitch, fov).with_settings(&self.settings);
        camera.aspect = self.aspect;
        camera
    }

    pub fn active(&self) -> Option<Entity> {
        self.active
    }

    pub fn set_active(&mut self, camera: Entity) {
        if let Some(previous) = self.active.replace(camera) {
            log::debug!("Active camera {previous} replaced by {camera}");
        }
    }

    pub fn clear_active(&mut self) {
        self.active = None;
    }

    /// Rotate and fly the active camera, then refresh its front vector.
    pub fn update(&self, components: &mut ComponentStore, input: &InputSystem, dt: f32) {
        let Some(entity) = self.active else {
            return;
        };
        let Some(camera) = components.try_get_mut::<Camera>(entity) else {
            return;
        };
        if input.mouse_look() {
            let (dx, dy) = input.mouse_offset();
            camera.rotate(dx, dy);
            camera.fly(input, dt);
        }
        camera.update_front();
    }

    /// Record a new viewport aspect and apply it to the active camera.
    pub fn set_aspect(&mut self, components: &mut ComponentStore, aspect: f32) {
        self.aspect = aspect;
        if let Some(entity) = self.active
            && let Some(camera) = components.try_get_mut::<Camera>(entity)
        {
            camera.aspect = aspect;
        }
    }

    /// The active camera component, if any.
    pub fn active_camera<'a>(&self, components: &'a ComponentStore) -> Option<&'a Camera> {
        self.active.and_then(|e| components.try_get::<Camera>(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecs::EntityRegistry;
    use crate::input::KeyCode;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn front_follows_yaw() {
        let mut cam = Camera::default();
        assert!(approx(cam.front, Vec3::NEG_Z));
        cam.yaw = 90.0;
        cam.update_front();
        assert!(approx(cam.front, Vec3::X));
        cam.yaw = 0.0;
        cam.pitch = 90.0;
        cam.update_front();
        assert!(approx(cam.front, Vec3::Y));
    }

    #[test]
    fn rotation_wraps_yaw_and_clamps_pitch() {
        let mut cam = Camera::default();
        cam.mouse_sensitivity = 1.0;
        cam.rotate(-10.0, 0.0);
        assert_eq!(cam.yaw, 350.0);
        cam.rotate(370.0, 0.0);
        assert!((cam.yaw - 0.0).abs() < 1e-3);
        cam.rotate(0.0, -500.0);
        assert_eq!(cam.pitch, PITCH_LIMIT);
        cam.rotate(0.0, 1000.0);
        assert_eq!(cam.pitch, -PITCH_LIMIT);
    }

    #[test]
    fn forward_moves_along_front() {
        let mut input = InputSystem::new();
        input.press_key(KeyCode::KeyW);

        let mut cam = Camera::default();
        cam.fly(&input, 1.0);
        assert!(approx(cam.position, Vec3::new(0.0, 0.0, -2.5)));

        let mut cam = Camera::new(Vec3::ZERO, 90.0, 0.0, 90.0);
        cam.fly(&input, 2.0);
        assert!(approx(cam.position, Vec3::new(5.0, 0.0, 0.0)));
    }

    #[test]
    fn update_skips_when_mouse_look_disabled() {
        let mut entities = EntityRegistry::new();
        let mut components = ComponentStore::new();
        let mut cameras = CameraSystem::new(CameraDefaults::default(), 1.0);
        let e = entities.create();
        components.insert(e, cameras.build_camera(Vec3::ZERO, 0.0, 0.0, 60.0));
        cameras.set_active(e);

        let mut input = InputSystem::new();
        input.press_key(KeyCode::KeyW);
        input.set_mouse_look(false);
        cameras.update(&mut components, &input, 1.0);
        assert_eq!(components.get::<Camera>(e).position, Vec3::ZERO);

        input.set_mouse_look(true);
        cameras.update(&mut components, &input, 1.0);
        assert!(components.get::<Camera>(e).position.z < 0.0);
    }

    #[test]
    fn update_without_active_camera_is_a_no_op() {
        let mut components = ComponentStore::new();
        let cameras = CameraSystem::new(CameraDefaults::default(), 1.0);
        cameras.update(&mut components, &InputSystem::new(), 1.0);
        assert!(cameras.active_camera(&components).is_none());
    }

    #[test]
    fn set_aspect_reaches_active_camera() {
        let mut entities = EntityRegistry::new();
        let mut components = ComponentStore::new();
        let mut cameras = CameraSystem::new(CameraDefaults::default(), 1.0);
        let e = entities.create();
        components.insert(e, cameras.build_camera(Vec3::ZERO, 0.0, 0.0, 60.0));
        cameras.set_active(e);

        cameras.set_aspect(&mut components, 2.0);
        assert_eq!(components.get::<Camera>(e).aspect, 2.0);
        assert_eq!(cameras.build_camera(Vec3::ZERO, 0.0, 0.0, 60.0).aspect, 2.0);
    }

    #[test]
    fn view_matrix_looks_along_front() {
        let cam = Camera::new(Vec3::new(0.0, 0.0, 5.0), 0.0, 0.0, 90.0);
        let origin_in_view = cam.view_matrix().transform_point3(Vec3::ZERO);
        assert!(approx(origin_in_view, Vec3::new(0.0, 0.0, -5.0)));
    }
}
