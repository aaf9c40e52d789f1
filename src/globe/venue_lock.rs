//! Venue lock
//!
//! Locking a camera onto a venue makes it follow the venue every frame and installs a
//! `SurfaceClamp` on the camera entity. The clamp is the per-frame correction hook:
//! inserting it again replaces it, removing it deregisters the correction.

use bevy::math::DVec3;
use bevy::prelude::*;

use super::config::GlobeConfig;
use super::constraints::ConstraintManager;
use super::controller::GlobeCamera;
use super::controller::ScreenSpaceController;
use super::error::GlobeError;
use super::geodesy::GeoPosition;
use super::geodesy::ReferenceSphere;
use crate::schedule::GlobeSet;

pub struct VenueLockPlugin;

impl Plugin for VenueLockPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(on_enter_venue_lock)
            .add_observer(on_exit_venue_lock)
            .add_systems(Update, follow_tracked_target.in_set(GlobeSet::Tracking))
            .add_systems(Update, clamp_above_surface.in_set(GlobeSet::Correction));
    }
}

#[derive(EntityEvent, Debug, Clone, Copy)]
pub struct EnterVenueLock {
    /// The camera being locked
    pub entity: Entity,
    pub target: Entity,
}

#[derive(EntityEvent, Debug, Clone, Copy)]
pub struct ExitVenueLock {
    pub entity: Entity,
}

/// Entity the camera follows, and where it was last seen.
#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct TrackedTarget {
    pub entity:        Entity,
    pub last_position: Option<DVec3>,
}

impl TrackedTarget {
    pub const fn new(entity: Entity) -> Self {
        Self {
            entity,
            last_position: None,
        }
    }
}

#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct SurfaceClamp {
    pub min_height:  f64,
    pub corrections: u32,
}

impl SurfaceClamp {
    pub const fn new(min_height: f64) -> Self {
        Self {
            min_height,
            corrections: 0,
        }
    }
}

pub fn resolve_target(
    entity: Entity,
    targets: &Query<&GeoPosition>,
    sphere: &ReferenceSphere,
) -> Result<DVec3, GlobeError> {
    targets
        .get(entity)
        .map(|position| sphere.surface_point(*position))
        .map_err(|_| GlobeError::TargetUnresolved(entity))
}

/// Lifts a camera below `min_height` radially to exactly `min_height`, re-aiming at
/// `target` when known and keeping the view direction otherwise.
pub fn correct_below_surface(
    camera: &mut GlobeCamera,
    sphere: &ReferenceSphere,
    min_height: f64,
    target: Option<DVec3>,
) -> bool {
    if sphere.height_of(camera.position) >= min_height {
        return false;
    }
    let lifted = sphere.lift(camera.position, min_height);
    camera.focus = target.unwrap_or(camera.focus + (lifted - camera.position));
    camera.position = lifted;
    true
}

fn on_enter_venue_lock(
    lock: On<EnterVenueLock>,
    mut commands: Commands,
    config: Res<GlobeConfig>,
    mut cameras: Query<(&mut ConstraintManager, &mut ScreenSpaceController)>,
) {
    let Ok((mut manager, mut controller)) = cameras.get_mut(lock.entity) else {
        return;
    };
    manager.enter_venue_lock(lock.target, &config, &mut controller);
    commands
        .entity(lock.entity)
        .insert(SurfaceClamp::new(config.min_camera_height));
    debug!("venue lock engaged on {}", lock.target);
}

fn on_exit_venue_lock(
    lock: On<ExitVenueLock>,
    mut commands: Commands,
    mut cameras: Query<(&mut ConstraintManager, &mut ScreenSpaceController)>,
) {
    let Ok((mut manager, mut controller)) = cameras.get_mut(lock.entity) else {
        return;
    };
    if manager.exit_venue_lock(&mut controller) {
        commands.entity(lock.entity).remove::<SurfaceClamp>();
        debug!("venue lock released");
    }
}

/// Moves the camera with its target so the target stays centered while orbiting.
fn follow_tracked_target(
    sphere: Res<ReferenceSphere>,
    targets: Query<&GeoPosition>,
    mut cameras: Query<(&mut GlobeCamera, &mut ConstraintManager)>,
) {
    for (mut camera, mut manager) in &mut cameras {
        let Some(tracked) = manager.tracked.as_mut() else {
            continue;
        };
        let position = match resolve_target(tracked.entity, &targets, &sphere) {
            Ok(position) => position,
            Err(e) => {
                debug!("{e}, skipping tracking this frame");
                continue;
            },
        };

        if let Some(last) = tracked.last_position
            && last != position
        {
            camera.position += position - last;
        }
        tracked.last_position = Some(position);
        if camera.focus != position {
            camera.focus = position;
        }
    }
}

fn clamp_above_surface(
    sphere: Res<ReferenceSphere>,
    targets: Query<&GeoPosition>,
    mut cameras: Query<(&mut GlobeCamera, &mut SurfaceClamp, &ConstraintManager)>,
) {
    for (mut camera, mut clamp, manager) in &mut cameras {
        if sphere.height_of(camera.position) >= clamp.min_height {
            continue;
        }
        let target = manager.tracked.as_ref().and_then(|tracked| {
            resolve_target(tracked.entity, &targets, &sphere)
                .inspect_err(|e| debug!("{e}, keeping view direction"))
                .ok()
        });
        if correct_below_surface(&mut camera, &sphere, clamp.min_height, target) {
            clamp.corrections += 1;
            trace!("camera lifted above surface ({} corrections)", clamp.corrections);
        }
    }
}
