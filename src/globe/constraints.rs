//! Camera constraint manager
//!
//! Per-camera state machine over `Overview`, `Venue` and `Transition`. Each mode has
//! zoom bounds that are pushed into the camera's `ScreenSpaceController`. Wheel input
//! is debounced; once it settles, a single check flies the camera back inside the
//! bounds if it ended up outside them.

use std::time::Duration;

use bevy::input::mouse::AccumulatedMouseScroll;
use bevy::math::DVec3;
use bevy::prelude::*;

use super::config::GlobeConfig;
use super::controller::GlobeCamera;
use super::controller::ScreenSpaceController;
use super::flight::CameraFlight;
use super::flight::CameraMove;
use super::flight::FlightPurpose;
use super::geodesy::GeoPosition;
use super::geodesy::ReferenceSphere;
use super::venue_lock::TrackedTarget;
use super::venue_lock::resolve_target;
use crate::schedule::GlobeSet;

pub struct ConstraintsPlugin;

impl Plugin for ConstraintsPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, record_wheel_input.in_set(GlobeSet::Input))
            .add_systems(Update, clamp_after_wheel_settles.in_set(GlobeSet::Constraints));
    }
}

#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CameraMode {
    #[default]
    Overview,
    Venue,
    Transition,
}

impl CameraMode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Overview => "Overview",
            Self::Venue => "Venue",
            Self::Transition => "Transition",
        }
    }
}

/// Allowed reference distance, `min <= max`.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct ZoomBounds {
    pub min: f64,
    pub max: f64,
}

impl ZoomBounds {
    pub fn new(min: f64, max: f64) -> Self {
        if min <= max {
            Self { min, max }
        } else {
            warn!("zoom bounds inverted ({min} > {max}), swapping");
            Self { min: max, max: min }
        }
    }

    pub fn contains(&self, distance: f64) -> bool { (self.min..=self.max).contains(&distance) }

    pub fn clamp(&self, distance: f64) -> f64 { distance.clamp(self.min, self.max) }
}

/// Keeps only the most recent wheel timestamp.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WheelDebounce {
    last_input: Option<Duration>,
}

impl WheelDebounce {
    pub fn record(&mut self, now: Duration) { self.last_input = Some(now); }

    pub fn clear(&mut self) { self.last_input = None; }

    pub const fn is_pending(&self) -> bool { self.last_input.is_some() }

    /// True once, when `settle` has passed since the last recorded input.
    pub fn take_settled(&mut self, now: Duration, settle: Duration) -> bool {
        match self.last_input {
            Some(last) if now.saturating_sub(last) >= settle => {
                self.last_input = None;
                true
            },
            _ => false,
        }
    }
}

#[derive(Component, Reflect, Debug, Clone, PartialEq)]
#[reflect(Component)]
pub struct ConstraintManager {
    mode:                CameraMode,
    bounds:              ZoomBounds,
    pub tracked:         Option<TrackedTarget>,
    pub wheel:           WheelDebounce,
    pub clamp_in_flight: bool,
}

impl ConstraintManager {
    pub fn new(mode: CameraMode, config: &GlobeConfig, controller: &mut ScreenSpaceController) -> Self {
        let mut manager = Self {
            mode,
            bounds: config.bounds_for(mode),
            tracked: None,
            wheel: WheelDebounce::default(),
            clamp_in_flight: false,
        };
        manager.apply_constraints(mode, config, controller);
        manager
    }

    pub const fn mode(&self) -> CameraMode { self.mode }

    pub const fn bounds(&self) -> ZoomBounds { self.bounds }

    pub fn is_locked(&self) -> bool { self.tracked.is_some() }

    /// Sets the mode and pushes its bounds into the controller. Idempotent.
    pub fn apply_constraints(
        &mut self,
        mode: CameraMode,
        config: &GlobeConfig,
        controller: &mut ScreenSpaceController,
    ) {
        self.mode = mode;
        self.bounds = config.bounds_for(mode);
        controller.min_zoom = self.bounds.min;
        controller.max_zoom = self.bounds.max;
    }

    /// Venue mode tracking `target`: rotate, tilt and zoom only, no collision detection.
    pub fn enter_venue_lock(
        &mut self,
        target: Entity,
        config: &GlobeConfig,
        controller: &mut ScreenSpaceController,
    ) {
        self.apply_constraints(CameraMode::Venue, config, controller);
        self.tracked = Some(TrackedTarget::new(target));
        controller.enable_collision_detection = false;
        controller.enable_translate = false;
        controller.enable_look = false;
        controller.enable_tilt = true;
        controller.enable_rotate = true;
        controller.enable_zoom = true;
    }

    /// Clears the tracked target and restores controller defaults.
    /// Returns `false` without touching anything when no lock is active.
    pub fn exit_venue_lock(&mut self, controller: &mut ScreenSpaceController) -> bool {
        if self.tracked.take().is_none() {
            return false;
        }
        controller.restore_defaults();
        true
    }
}

/// Where the camera should fly to get back inside `bounds`, or `None` when it is
/// already inside, in `Transition`, or the venue target is unknown.
///
/// Overview distances are heights above the surface point below the camera; venue
/// distances are measured from the target, keeping the viewing direction.
pub fn clamp_target(
    camera: &GlobeCamera,
    mode: CameraMode,
    bounds: ZoomBounds,
    target: Option<DVec3>,
    sphere: &ReferenceSphere,
) -> Option<DVec3> {
    match mode {
        CameraMode::Transition => None,
        CameraMode::Overview => {
            let height = sphere.height_of(camera.position);
            (!bounds.contains(height)).then(|| sphere.lift(camera.position, bounds.clamp(height)))
        },
        CameraMode::Venue => {
            let target = target?;
            let offset = camera.position - target;
            let distance = offset.length();
            if bounds.contains(distance) {
                return None;
            }
            let direction = offset.try_normalize()?;
            Some(target + direction * bounds.clamp(distance))
        },
    }
}

fn record_wheel_input(
    time: Res<Time>,
    scroll: Res<AccumulatedMouseScroll>,
    mut managers: Query<&mut ConstraintManager>,
) {
    if scroll.delta == Vec2::ZERO {
        return;
    }
    for mut manager in &mut managers {
        if !manager.clamp_in_flight {
            manager.wheel.record(time.elapsed());
        }
    }
}

fn clamp_after_wheel_settles(
    mut commands: Commands,
    time: Res<Time>,
    config: Res<GlobeConfig>,
    sphere: Res<ReferenceSphere>,
    targets: Query<&GeoPosition>,
    mut cameras: Query<(Entity, &GlobeCamera, &mut ConstraintManager), Without<CameraFlight>>,
) {
    for (entity, camera, mut manager) in &mut cameras {
        if !manager.wheel.is_pending() {
            continue;
        }
        if manager.mode() == CameraMode::Transition {
            manager.wheel.clear();
            continue;
        }
        if !manager.wheel.take_settled(time.elapsed(), config.wheel_settle()) {
            continue;
        }

        let target = manager
            .tracked
            .as_ref()
            .and_then(|tracked| resolve_target(tracked.entity, &targets, &sphere).ok());
        let Some(destination) =
            clamp_target(camera, manager.mode(), manager.bounds(), target, &sphere)
        else {
            continue;
        };

        debug!(
            "clamping camera to {:?} bounds after wheel input",
            manager.mode()
        );
        manager.clamp_in_flight = true;
        commands.entity(entity).insert(CameraFlight::new(
            [CameraMove {
                target_position: destination,
                target_focus:    target.unwrap_or(camera.focus),
                duration_ms:     config.clamp_flight_ms,
            }],
            FlightPurpose::Clamp,
        ));
    }
}

#[cfg(test)]
mod tests {
    use bevy::time::TimeUpdateStrategy;

    use super::*;
    use crate::schedule::SchedulePlugin;
    use crate::state::Experience;

    fn manager(mode: CameraMode) -> (ConstraintManager, ScreenSpaceController) {
        let mut controller = ScreenSpaceController::default();
        let manager = ConstraintManager::new(mode, &GlobeConfig::default(), &mut controller);
        (manager, controller)
    }

    #[test]
    fn applying_venue_constraints_twice_equals_once() {
        let config = GlobeConfig::default();
        let (mut once, mut once_controller) = manager(CameraMode::Overview);
        once.apply_constraints(CameraMode::Venue, &config, &mut once_controller);

        let (mut twice, mut twice_controller) = manager(CameraMode::Overview);
        twice.apply_constraints(CameraMode::Venue, &config, &mut twice_controller);
        twice.apply_constraints(CameraMode::Venue, &config, &mut twice_controller);

        assert_eq!(once, twice);
        assert_eq!(once_controller, twice_controller);
        assert!((twice_controller.min_zoom - 500.0).abs() < f64::EPSILON);
        assert!((twice_controller.max_zoom - 1_000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn inverted_zoom_settings_are_reordered() {
        assert_eq!(ZoomBounds::new(1_000.0, 500.0), ZoomBounds::new(500.0, 1_000.0));

        let config = GlobeConfig {
            venue_min_zoom: 1_000.0,
            venue_max_zoom: 500.0,
            ..GlobeConfig::default()
        };
        let (mut manager, mut controller) = manager(CameraMode::Overview);
        manager.apply_constraints(CameraMode::Venue, &config, &mut controller);
        assert!((controller.min_zoom - 500.0).abs() < f64::EPSILON);
        assert!((controller.max_zoom - 1_000.0).abs() < f64::EPSILON);
        assert!(manager.bounds().contains(750.0));
    }

    #[test]
    fn exiting_without_a_lock_changes_nothing() {
        let (mut manager, mut controller) = manager(CameraMode::Overview);
        let before = (manager.clone(), controller);
        assert!(!manager.exit_venue_lock(&mut controller));
        assert_eq!((manager, controller), before);
        assert!(controller.enable_translate && controller.enable_collision_detection);
    }

    #[test]
    fn venue_lock_restricts_controls_until_exit() {
        let config = GlobeConfig::default();
        let (mut manager, mut controller) = manager(CameraMode::Transition);
        manager.enter_venue_lock(Entity::PLACEHOLDER, &config, &mut controller);

        assert_eq!(manager.mode(), CameraMode::Venue);
        assert!(manager.is_locked());
        assert!(!controller.enable_translate);
        assert!(!controller.enable_look);
        assert!(!controller.enable_collision_detection);
        assert!(controller.enable_rotate && controller.enable_tilt && controller.enable_zoom);

        assert!(manager.exit_venue_lock(&mut controller));
        assert!(!manager.is_locked());
        assert_eq!(
            controller,
            ScreenSpaceController {
                min_zoom: 500.0,
                max_zoom: 1_000.0,
                ..ScreenSpaceController::default()
            }
        );
    }

    #[test]
    fn debounce_fires_once_after_quiet_period() {
        let settle = Duration::from_millis(150);
        let mut wheel = WheelDebounce::default();
        for i in 0..10 {
            wheel.record(Duration::from_millis(i * 15));
        }
        let last = Duration::from_millis(135);

        let mut fired_at = Vec::new();
        for ms in (0..600).step_by(5) {
            let now = Duration::from_millis(ms);
            if wheel.take_settled(now, settle) {
                fired_at.push(now);
            }
        }
        assert_eq!(fired_at, vec![last + settle]);
    }

    #[test]
    fn overview_clamp_moves_radially_to_nearest_bound() {
        let sphere = ReferenceSphere::default();
        let bounds = GlobeConfig::default().bounds_for(CameraMode::Overview);
        let camera = GlobeCamera::new(DVec3::Y * (sphere.radius + 500_000.0), DVec3::ZERO);

        let Some(destination) = clamp_target(&camera, CameraMode::Overview, bounds, None, &sphere)
        else {
            panic!("camera below the overview minimum must be clamped");
        };
        assert!((sphere.height_of(destination) - 2_000_000.0).abs() < 1e-3);
        assert!(destination.normalize().distance(DVec3::Y) < 1e-12);
    }

    #[test]
    fn venue_clamp_keeps_direction_and_needs_a_target() {
        let sphere = ReferenceSphere::default();
        let bounds = GlobeConfig::default().bounds_for(CameraMode::Venue);
        let venue = DVec3::X * sphere.radius;
        let camera = GlobeCamera::new(venue + DVec3::new(3_000.0, 4_000.0, 0.0), venue);

        assert!(clamp_target(&camera, CameraMode::Venue, bounds, None, &sphere).is_none());
        let Some(destination) =
            clamp_target(&camera, CameraMode::Venue, bounds, Some(venue), &sphere)
        else {
            panic!("camera beyond the venue maximum must be clamped");
        };
        assert!((destination - (venue + DVec3::new(600.0, 800.0, 0.0))).length() < 1e-6);
    }

    #[test]
    fn transition_never_clamps() {
        let sphere = ReferenceSphere::default();
        let camera = GlobeCamera::new(DVec3::X * (sphere.radius + 10.0), DVec3::ZERO);
        let bounds = GlobeConfig::default().bounds_for(CameraMode::Overview);
        assert!(clamp_target(&camera, CameraMode::Transition, bounds, None, &sphere).is_none());
    }

    #[test]
    fn wheel_burst_schedules_a_single_clamp_flight() {
        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            bevy::state::app::StatesPlugin,
            SchedulePlugin,
            ConstraintsPlugin,
        ))
        .insert_state(Experience::Globe)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(10)))
        .init_resource::<AccumulatedMouseScroll>()
        .init_resource::<GlobeConfig>()
        .init_resource::<ReferenceSphere>();

        let sphere = ReferenceSphere::default();
        let mut controller = ScreenSpaceController::default();
        let manager =
            ConstraintManager::new(CameraMode::Overview, &GlobeConfig::default(), &mut controller);
        let camera = app
            .world_mut()
            .spawn((
                GlobeCamera::new(DVec3::X * (sphere.radius + 1_000_000.0), DVec3::ZERO),
                controller,
                manager,
            ))
            .id();
        app.update();

        for _ in 0..10 {
            app.world_mut().resource_mut::<AccumulatedMouseScroll>().delta = Vec2::new(0.0, 1.0);
            app.update();
        }
        app.world_mut().resource_mut::<AccumulatedMouseScroll>().delta = Vec2::ZERO;

        let mut flights = 0;
        for _ in 0..30 {
            app.update();
            if app.world().get::<CameraFlight>(camera).is_some() {
                flights += 1;
                app.world_mut().entity_mut(camera).remove::<CameraFlight>();
            }
        }

        assert_eq!(flights, 1);
        let Some(manager) = app.world().get::<ConstraintManager>(camera) else {
            panic!("camera keeps its constraint manager");
        };
        assert!(manager.clamp_in_flight);
    }
}
