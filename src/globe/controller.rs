//! Screen-space camera controller
//!
//! `GlobeCamera` holds the camera as a position and a focus point in globe-frame
//! meters. Mouse input moves it according to the `ScreenSpaceController` flags;
//! the render `Transform` is derived from it once per frame.

use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::input::mouse::AccumulatedMouseScroll;
use bevy::input::mouse::MouseScrollUnit;
use bevy::math::DQuat;
use bevy::math::DVec2;
use bevy::math::DVec3;
use bevy::prelude::*;

use super::config::GlobeConfig;
use super::constants::COLLISION_MARGIN;
use super::constants::ELEVATION_LIMIT_DEG;
use super::constants::PIXELS_PER_SCROLL_LINE;
use super::flight::CameraFlight;
use super::geodesy::ReferenceSphere;
use super::geodesy::tangent_frame;
use super::geodesy::to_render;
use super::geodesy::up_at;
use crate::schedule::GlobeSet;

pub struct ControllerPlugin;

impl Plugin for ControllerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, apply_camera_input.in_set(GlobeSet::Input))
            .add_systems(Update, sync_camera_transform.in_set(GlobeSet::Sync));
    }
}

/// Which gestures the user may perform, and the zoom range enforced while zooming.
#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct ScreenSpaceController {
    pub enable_translate:           bool,
    pub enable_look:                bool,
    pub enable_tilt:                bool,
    pub enable_rotate:              bool,
    pub enable_zoom:                bool,
    pub enable_collision_detection: bool,
    pub min_zoom:                   f64,
    pub max_zoom:                   f64,
}

impl Default for ScreenSpaceController {
    fn default() -> Self {
        Self {
            enable_translate:           true,
            enable_look:                true,
            enable_tilt:                true,
            enable_rotate:              true,
            enable_zoom:                true,
            enable_collision_detection: true,
            min_zoom:                   1.0,
            max_zoom:                   f64::INFINITY,
        }
    }
}

impl ScreenSpaceController {
    /// Every gesture enabled and collision on; zoom range is kept.
    pub fn restore_defaults(&mut self) {
        *self = Self {
            min_zoom: self.min_zoom,
            max_zoom: self.max_zoom,
            ..Self::default()
        };
    }
}

#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct GlobeCamera {
    pub position: DVec3,
    pub focus:    DVec3,
}

impl GlobeCamera {
    pub const fn new(position: DVec3, focus: DVec3) -> Self { Self { position, focus } }

    /// A focus far from the surface (the globe's center) means the camera orbits the globe.
    fn focus_is_center(&self, sphere: &ReferenceSphere) -> bool {
        self.focus.length() < sphere.radius * 0.5
    }

    pub fn view_direction(&self) -> DVec3 {
        (self.focus - self.position)
            .try_normalize()
            .unwrap_or_else(|| -up_at(self.position))
    }

    /// Distance the controller's zoom range applies to: height above the surface
    /// when orbiting the globe, distance to the focus otherwise.
    pub fn zoom_reference(&self, sphere: &ReferenceSphere) -> f64 {
        if self.focus_is_center(sphere) {
            sphere.height_of(self.position)
        } else {
            self.position.distance(self.focus)
        }
    }

    /// Rotates the camera around its focus: `yaw` about the focus' vertical, then
    /// `pitch` toward it. Elevation stays within the orbit limit.
    pub fn orbit(&mut self, yaw: f64, pitch: f64) {
        let up = up_at(self.focus);
        let offset = DQuat::from_axis_angle(up, yaw) * (self.position - self.focus);
        let distance = offset.length();
        if distance <= f64::EPSILON {
            return;
        }

        let limit = ELEVATION_LIMIT_DEG.to_radians();
        let elevation = (offset.dot(up) / distance).clamp(-1.0, 1.0).asin();
        let target = (elevation + pitch).clamp(-limit, limit);
        let axis = offset
            .cross(up)
            .try_normalize()
            .unwrap_or_else(|| tangent_frame(self.focus).0);

        self.position = self.focus + DQuat::from_axis_angle(axis, target - elevation) * offset;
    }

    /// Scales the zoom reference by `factor`. A step that would move further outside
    /// `[min_zoom, max_zoom]` is refused; a step that crosses a bound is allowed and
    /// left for the settle clamp.
    pub fn zoom(&mut self, factor: f64, controller: &ScreenSpaceController, sphere: &ReferenceSphere) {
        let current = self.zoom_reference(sphere);
        let zooming_in = factor < 1.0;
        if (zooming_in && current <= controller.min_zoom)
            || (!zooming_in && current >= controller.max_zoom)
        {
            return;
        }

        if self.focus_is_center(sphere) {
            self.position = sphere.lift(self.position, current * factor);
        } else {
            self.position = self.focus + (self.position - self.focus) * factor;
        }
    }

    /// Moves camera and focus together across the surface by screen-space `right`/`up`
    /// amounts, expressed as fractions of the zoom reference.
    pub fn translate(&mut self, right: f64, up: f64, sphere: &ReferenceSphere) {
        if self.focus_is_center(sphere) {
            self.orbit(-right, -up);
            return;
        }

        let scale = self.zoom_reference(sphere);
        let (east, north) = tangent_frame(self.focus);
        let shift = (east * right + north * up) * scale;
        let focus_height = sphere.height_of(self.focus);
        let moved_focus = sphere.lift(self.focus + shift, focus_height);
        self.position += moved_focus - self.focus;
        self.focus = moved_focus;
    }

    /// Turns the view direction in place; the camera does not move.
    pub fn free_look(&mut self, yaw: f64, pitch: f64) {
        let up = up_at(self.position);
        let offset = self.focus - self.position;
        let turned = DQuat::from_axis_angle(up, yaw) * offset;
        // looking straight down has no horizontal heading, so pitch about east
        let axis = turned.normalize().cross(up);
        let right = if axis.length_squared() > 1e-12 {
            axis.normalize()
        } else {
            tangent_frame(self.position).0
        };
        let pitched = DQuat::from_axis_angle(right, pitch) * turned;
        let vertical = |view: DVec3| view.normalize().dot(up).abs();
        // refuse pitches that would turn the view onto the vertical
        if vertical(pitched) < 0.999 || vertical(pitched) < vertical(turned) {
            self.focus = self.position + pitched;
        } else {
            self.focus = self.position + turned;
        }
    }

    /// Pushes the camera out to `margin` above the surface. Returns whether it moved.
    pub fn collide(&mut self, sphere: &ReferenceSphere, margin: f64) -> bool {
        if sphere.height_of(self.position) >= margin {
            return false;
        }
        let lifted = sphere.lift(self.position, margin);
        if !self.focus_is_center(sphere) {
            self.focus += lifted - self.position;
        }
        self.position = lifted;
        true
    }

    pub fn transform(&self, sphere: &ReferenceSphere) -> Transform {
        let direction = self.view_direction();
        let mut up_hint = if self.focus_is_center(sphere) {
            DVec3::Y
        } else {
            up_at(self.focus)
        };
        if direction.dot(up_hint).abs() > 0.999 {
            up_hint = tangent_frame(self.position).1;
        }
        Transform::from_translation(to_render(self.position))
            .looking_to(direction.as_vec3(), up_hint.as_vec3())
    }
}

fn apply_camera_input(
    mouse: Res<ButtonInput<MouseButton>>,
    keys: Res<ButtonInput<KeyCode>>,
    motion: Res<AccumulatedMouseMotion>,
    scroll: Res<AccumulatedMouseScroll>,
    config: Res<GlobeConfig>,
    sphere: Res<ReferenceSphere>,
    interactions: Query<&Interaction>,
    mut cameras: Query<(&ScreenSpaceController, &mut GlobeCamera), Without<CameraFlight>>,
) {
    let over_ui = interactions.iter().any(|interaction| *interaction != Interaction::None);
    let drag = motion.delta.as_dvec2();
    let scroll_lines = match scroll.unit {
        MouseScrollUnit::Line => scroll.delta.y,
        MouseScrollUnit::Pixel => scroll.delta.y / PIXELS_PER_SCROLL_LINE,
    };
    let ctrl = keys.any_pressed([KeyCode::ControlLeft, KeyCode::ControlRight]);

    for (controller, mut camera) in &mut cameras {
        if !over_ui && drag != DVec2::ZERO {
            let rotate = f64::from(config.rotate_sensitivity);
            if mouse.pressed(MouseButton::Left) {
                if ctrl {
                    if controller.enable_tilt {
                        camera.orbit(0.0, drag.y * rotate);
                    }
                } else if controller.enable_rotate {
                    camera.orbit(-drag.x * rotate, drag.y * rotate);
                }
            }
            if mouse.pressed(MouseButton::Right) && controller.enable_translate {
                let translate = f64::from(config.translate_sensitivity);
                camera.translate(-drag.x * translate, drag.y * translate, &sphere);
            }
            if mouse.pressed(MouseButton::Middle) && controller.enable_look {
                let look = f64::from(config.look_sensitivity);
                camera.free_look(-drag.x * look, -drag.y * look);
            }
        }

        if scroll_lines != 0.0 && controller.enable_zoom && !over_ui {
            let factor = f64::from(-scroll_lines * config.zoom_sensitivity).exp();
            camera.zoom(factor, controller, &sphere);
        }

        if controller.enable_collision_detection {
            camera.collide(&sphere, COLLISION_MARGIN);
        }
    }
}

fn sync_camera_transform(
    sphere: Res<ReferenceSphere>,
    mut cameras: Query<(&GlobeCamera, &mut Transform), Changed<GlobeCamera>>,
) {
    for (camera, mut transform) in &mut cameras {
        *transform = camera.transform(&sphere);
    }
}
