//! Camera flights
//! Queued, timed moves of a `GlobeCamera`. Positions travel along the arc around the
//! globe's center so long flights curve over the surface instead of cutting through it.

//! There's a false positive on this lint for the `FlightState` enum
#![allow(clippy::used_underscore_binding)]

use std::collections::VecDeque;

use bevy::math::DQuat;
use bevy::math::DVec3;
use bevy::prelude::*;

use super::controller::GlobeCamera;
use crate::schedule::GlobeSet;

pub struct FlightPlugin;

impl Plugin for FlightPlugin {
    fn build(&self, app: &mut App) { app.add_systems(Update, fly_camera.in_set(GlobeSet::Flight)); }
}

/// One leg of a flight
#[derive(Clone, Copy, Debug, Reflect)]
pub struct CameraMove {
    pub target_position: DVec3,
    pub target_focus:    DVec3,
    pub duration_ms:     f32,
}

/// Why the camera is flying; reported back when the flight lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Reflect)]
pub enum FlightPurpose {
    Clamp,
    ToVenue(Entity),
    ToOverview,
}

#[derive(Clone, Copy, Reflect, Default, Debug)]
enum FlightState {
    InProgress {
        elapsed_ms:     f32,
        start_position: DVec3,
        start_focus:    DVec3,
    },
    #[default]
    Ready,
}

/// Inserting a new flight replaces the one in progress, which then never reports.
#[derive(Component, Reflect, Debug)]
#[reflect(Component)]
pub struct CameraFlight {
    moves:       VecDeque<CameraMove>,
    state:       FlightState,
    pub purpose: FlightPurpose,
}

impl CameraFlight {
    pub fn new(moves: impl IntoIterator<Item = CameraMove>, purpose: FlightPurpose) -> Self {
        Self {
            moves: moves.into_iter().collect(),
            state: FlightState::Ready,
            purpose,
        }
    }
}

/// Sent on the camera entity when its queue empties.
#[derive(EntityEvent, Debug, Clone, Copy)]
pub struct FlightFinished {
    pub entity:  Entity,
    pub purpose: FlightPurpose,
}

/// Position `t` of the way from `start` to `end`: direction slerped around the
/// globe's center, distance from the center lerped.
pub fn arc_between(start: DVec3, end: DVec3, t: f64) -> DVec3 {
    let (Some(from), Some(to)) = (start.try_normalize(), end.try_normalize()) else {
        return start.lerp(end, t);
    };
    let radius = start.length().lerp(end.length(), t);
    DQuat::IDENTITY.slerp(DQuat::from_rotation_arc(from, to), t) * from * radius
}

fn ease_in_out(t: f64) -> f64 { t * t * 2.0f64.mul_add(-t, 3.0) }

fn fly_camera(
    mut commands: Commands,
    time: Res<Time>,
    mut cameras: Query<(Entity, &mut GlobeCamera, &mut CameraFlight)>,
) {
    for (entity, mut camera, mut flight) in &mut cameras {
        let Some(current) = flight.moves.front().copied() else {
            commands.entity(entity).remove::<CameraFlight>();
            commands.trigger(FlightFinished {
                entity,
                purpose: flight.purpose,
            });
            continue;
        };

        match &mut flight.state {
            FlightState::Ready => {
                flight.state = FlightState::InProgress {
                    elapsed_ms:     0.0,
                    start_position: camera.position,
                    start_focus:    camera.focus,
                };
            },
            FlightState::InProgress {
                elapsed_ms,
                start_position,
                start_focus,
            } => {
                *elapsed_ms += time.delta_secs() * 1000.0;
                let t = if current.duration_ms <= 0.0 {
                    1.0
                } else {
                    (*elapsed_ms / current.duration_ms).min(1.0)
                };
                let eased = ease_in_out(f64::from(t));

                camera.position = arc_between(*start_position, current.target_position, eased);
                camera.focus = start_focus.lerp(current.target_focus, eased);

                if t >= 1.0 {
                    flight.moves.pop_front();
                    flight.state = FlightState::Ready;
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::state::app::StatesPlugin;
    use bevy::time::TimeUpdateStrategy;

    use super::*;
    use crate::schedule::SchedulePlugin;
    use crate::state::Experience;

    #[test]
    fn arc_keeps_interpolated_radius() {
        let start = DVec3::X * 10.0;
        let end = DVec3::Y * 20.0;
        let mid = arc_between(start, end, 0.5);
        assert!((mid.length() - 15.0).abs() < 1e-9);
        assert!((mid.normalize() - DVec3::new(1.0, 1.0, 0.0).normalize()).length() < 1e-9);
        assert!((arc_between(start, end, 1.0) - end).length() < 1e-9);
    }

    #[test]
    fn easing_is_pinned_at_the_ends() {
        assert!(ease_in_out(0.0).abs() < f64::EPSILON);
        assert!((ease_in_out(1.0) - 1.0).abs() < f64::EPSILON);
        assert!((ease_in_out(0.5) - 0.5).abs() < f64::EPSILON);
    }

    #[derive(Resource, Default)]
    struct Landed(Vec<FlightPurpose>);

    #[test]
    fn flight_lands_on_target_and_reports_once() {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, StatesPlugin, SchedulePlugin, FlightPlugin))
            .insert_state(Experience::Globe)
            .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(50)))
            .init_resource::<Landed>()
            .add_observer(|finished: On<FlightFinished>, mut landed: ResMut<Landed>| {
                landed.0.push(finished.purpose);
            });

        let target = DVec3::new(0.0, 7_000_000.0, 0.0);
        let camera = app
            .world_mut()
            .spawn((
                GlobeCamera::new(DVec3::X * 7_000_000.0, DVec3::ZERO),
                CameraFlight::new(
                    [CameraMove {
                        target_position: target,
                        target_focus:    DVec3::ZERO,
                        duration_ms:     300.0,
                    }],
                    FlightPurpose::ToOverview,
                ),
            ))
            .id();

        for _ in 0..20 {
            app.update();
        }

        assert!(app.world().get::<CameraFlight>(camera).is_none());
        assert_eq!(app.world().resource::<Landed>().0, vec![FlightPurpose::ToOverview]);
        let Some(globe_camera) = app.world().get::<GlobeCamera>(camera) else {
            panic!("camera exists");
        };
        assert!((globe_camera.position - target).length() < 1e-3);
    }
}
