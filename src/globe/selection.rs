//! Selecting a stop flies the camera to the venue and locks onto it; returning
//! releases the lock and flies back to the overview home.

use bevy::input::common_conditions::input_just_pressed;
use bevy::math::DVec3;
use bevy::prelude::*;

use super::config::GlobeConfig;
use super::constants::VENUE_STANDOFF_DISTANCE;
use super::constants::VENUE_STANDOFF_ELEVATION_DEG;
use super::constraints::CameraMode;
use super::constraints::ConstraintManager;
use super::controller::GlobeCamera;
use super::controller::ScreenSpaceController;
use super::flight::CameraFlight;
use super::flight::CameraMove;
use super::flight::FlightFinished;
use super::flight::FlightPurpose;
use super::geodesy::GeoPosition;
use super::geodesy::ReferenceSphere;
use super::geodesy::tangent_frame;
use super::geodesy::up_at;
use super::markers::VenueMarker;
use super::scene::overview_home;
use super::stops::SelectedStop;
use super::venue_lock::EnterVenueLock;
use super::venue_lock::ExitVenueLock;
use crate::schedule::GlobeSet;
use crate::state::Experience;

pub struct SelectionPlugin;

impl Plugin for SelectionPlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(select_stop)
            .add_observer(return_to_overview)
            .add_observer(land_flight)
            .add_systems(OnExit(Experience::Globe), clear_selection)
            .add_systems(
                Update,
                request_overview
                    .run_if(input_just_pressed(KeyCode::Escape))
                    .in_set(GlobeSet::Input),
            );
    }
}

#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub struct SelectStop {
    pub stop_id: String,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct ReturnToOverview;

/// Where the camera parks when flying to a venue: south of it, looking north and
/// down at the venue.
pub fn venue_standoff(venue: DVec3) -> DVec3 {
    let (_, north) = tangent_frame(venue);
    let elevation = VENUE_STANDOFF_ELEVATION_DEG.to_radians();
    let offset = up_at(venue) * elevation.sin() - north * elevation.cos();
    venue + offset * VENUE_STANDOFF_DISTANCE
}

/// Releases any lock and opens the zoom range so a flight can pass through it.
fn begin_transition(
    commands: &mut Commands,
    camera: Entity,
    manager: &mut ConstraintManager,
    controller: &mut ScreenSpaceController,
    config: &GlobeConfig,
) {
    commands.trigger(ExitVenueLock { entity: camera });
    manager.apply_constraints(CameraMode::Transition, config, controller);
    manager.clamp_in_flight = false;
    manager.wheel.clear();
}

fn select_stop(
    select: On<SelectStop>,
    mut commands: Commands,
    config: Res<GlobeConfig>,
    sphere: Res<ReferenceSphere>,
    mut selected: ResMut<SelectedStop>,
    markers: Query<(Entity, &VenueMarker, &GeoPosition)>,
    mut cameras: Query<(Entity, &mut ConstraintManager, &mut ScreenSpaceController), With<GlobeCamera>>,
) {
    let Some((marker, _, position)) = markers
        .iter()
        .find(|(_, marker, _)| marker.stop_id == select.stop_id)
    else {
        warn!("stop {} has no marker on the globe", select.stop_id);
        return;
    };

    selected.0 = Some(select.stop_id.clone());
    let venue = sphere.surface_point(*position);
    for (camera, mut manager, mut controller) in &mut cameras {
        begin_transition(&mut commands, camera, &mut manager, &mut controller, &config);
        commands.entity(camera).insert(CameraFlight::new(
            [CameraMove {
                target_position: venue_standoff(venue),
                target_focus:    venue,
                duration_ms:     config.venue_flight_ms,
            }],
            FlightPurpose::ToVenue(marker),
        ));
    }
    info!("flying to {}", select.stop_id);
}

fn request_overview(mut commands: Commands) { commands.trigger(ReturnToOverview); }

// the globe always reopens at the overview, so nothing may stay selected
fn clear_selection(mut selected: ResMut<SelectedStop>) { selected.0 = None; }

fn return_to_overview(
    _return: On<ReturnToOverview>,
    mut commands: Commands,
    config: Res<GlobeConfig>,
    sphere: Res<ReferenceSphere>,
    mut selected: ResMut<SelectedStop>,
    mut cameras: Query<(Entity, &mut ConstraintManager, &mut ScreenSpaceController), With<GlobeCamera>>,
) {
    selected.0 = None;
    let home = overview_home(&sphere, &config);
    for (camera, mut manager, mut controller) in &mut cameras {
        begin_transition(&mut commands, camera, &mut manager, &mut controller, &config);
        commands.entity(camera).insert(CameraFlight::new(
            [CameraMove {
                target_position: home.position,
                target_focus:    home.focus,
                duration_ms:     config.overview_flight_ms,
            }],
            FlightPurpose::ToOverview,
        ));
    }
    info!("returning to overview");
}

fn land_flight(
    finished: On<FlightFinished>,
    mut commands: Commands,
    config: Res<GlobeConfig>,
    mut cameras: Query<(&mut ConstraintManager, &mut ScreenSpaceController)>,
) {
    let Ok((mut manager, mut controller)) = cameras.get_mut(finished.entity) else {
        return;
    };
    match finished.purpose {
        FlightPurpose::ToVenue(target) => commands.trigger(EnterVenueLock {
            entity: finished.entity,
            target,
        }),
        FlightPurpose::ToOverview => {
            manager.apply_constraints(CameraMode::Overview, &config, &mut controller);
        },
        FlightPurpose::Clamp => manager.clamp_in_flight = false,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::state::app::StatesPlugin;
    use bevy::time::TimeUpdateStrategy;

    use super::*;
    use crate::globe::flight::FlightPlugin;
    use crate::globe::venue_lock::SurfaceClamp;
    use crate::globe::venue_lock::VenueLockPlugin;
    use crate::schedule::SchedulePlugin;

    const TORONTO: GeoPosition = GeoPosition::new(43.6435, -79.3791);

    #[test]
    fn standoff_is_south_of_and_above_the_venue() {
        let sphere = ReferenceSphere::default();
        let venue = sphere.surface_point(TORONTO);
        let standoff = venue_standoff(venue);
        assert!((standoff.distance(venue) - VENUE_STANDOFF_DISTANCE).abs() < 1e-6);
        assert!(sphere.height_of(standoff) > 400.0);
        assert!(GeoPosition::from_point(standoff).lat_deg < TORONTO.lat_deg);
    }

    struct Tour {
        app:    App,
        camera: Entity,
        venue:  DVec3,
    }

    fn tour() -> Tour {
        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            StatesPlugin,
            SchedulePlugin,
            FlightPlugin,
            VenueLockPlugin,
            SelectionPlugin,
        ))
        .insert_state(Experience::Globe)
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(100)))
        .init_resource::<GlobeConfig>()
        .init_resource::<ReferenceSphere>()
        .init_resource::<SelectedStop>()
        .init_resource::<ButtonInput<KeyCode>>();

        app.world_mut().spawn((
            VenueMarker {
                stop_id:  "toronto-scotiabankarena".into(),
                selected: false,
            },
            TORONTO,
        ));
        let config = GlobeConfig::default();
        let sphere = ReferenceSphere::default();
        let mut controller = ScreenSpaceController::default();
        let manager = ConstraintManager::new(CameraMode::Overview, &config, &mut controller);
        let camera = app
            .world_mut()
            .spawn((overview_home(&sphere, &config), controller, manager))
            .id();
        app.update();

        Tour {
            app,
            camera,
            venue: sphere.surface_point(TORONTO),
        }
    }

    fn manager(app: &App, camera: Entity) -> ConstraintManager {
        let Some(manager) = app.world().get::<ConstraintManager>(camera) else {
            panic!("camera has a constraint manager");
        };
        manager.clone()
    }

    #[test]
    fn selecting_flies_in_transition_then_locks_on_the_venue() {
        let Tour {
            mut app,
            camera,
            venue,
        } = tour();

        app.world_mut().trigger(SelectStop {
            stop_id: "toronto-scotiabankarena".into(),
        });
        app.update();
        assert_eq!(manager(&app, camera).mode(), CameraMode::Transition);
        assert!(app.world().get::<CameraFlight>(camera).is_some());
        assert!(app.world().resource::<SelectedStop>().is("toronto-scotiabankarena"));

        for _ in 0..30 {
            app.update();
        }
        let locked = manager(&app, camera);
        assert_eq!(locked.mode(), CameraMode::Venue);
        assert!(locked.is_locked());
        assert!(app.world().get::<SurfaceClamp>(camera).is_some());
        let Some(globe_camera) = app.world().get::<GlobeCamera>(camera) else {
            panic!("camera exists");
        };
        assert!((globe_camera.position.distance(venue) - VENUE_STANDOFF_DISTANCE).abs() < 1e-2);
        assert!(globe_camera.focus.distance(venue) < 1e-6);
    }

    #[test]
    fn returning_releases_the_lock_and_restores_overview() {
        let Tour { mut app, camera, .. } = tour();
        app.world_mut().trigger(SelectStop {
            stop_id: "toronto-scotiabankarena".into(),
        });
        for _ in 0..30 {
            app.update();
        }

        app.world_mut().trigger(ReturnToOverview);
        app.update();
        assert!(!manager(&app, camera).is_locked());
        assert_eq!(manager(&app, camera).mode(), CameraMode::Transition);
        assert!(app.world().get::<SurfaceClamp>(camera).is_none());
        assert!(app.world().resource::<SelectedStop>().0.is_none());

        for _ in 0..30 {
            app.update();
        }
        assert_eq!(manager(&app, camera).mode(), CameraMode::Overview);
        let Some(controller) = app.world().get::<ScreenSpaceController>(camera) else {
            panic!("camera keeps its controller");
        };
        assert!(controller.enable_translate && controller.enable_collision_detection);
    }

    #[test]
    fn unknown_stop_changes_nothing() {
        let Tour { mut app, camera, .. } = tour();
        app.world_mut().trigger(SelectStop {
            stop_id: "ottawa-canadiantirecentre".into(),
        });
        app.update();
        assert_eq!(manager(&app, camera).mode(), CameraMode::Overview);
        assert!(app.world().get::<CameraFlight>(camera).is_none());
        assert!(app.world().resource::<SelectedStop>().0.is_none());
    }

    #[test]
    fn leaving_the_globe_clears_the_selection() {
        let Tour { mut app, .. } = tour();
        app.world_mut().trigger(SelectStop {
            stop_id: "toronto-scotiabankarena".into(),
        });
        app.update();
        assert!(app.world().resource::<SelectedStop>().is("toronto-scotiabankarena"));

        app.world_mut()
            .resource_mut::<NextState<Experience>>()
            .set(Experience::Countdown);
        app.update();
        assert!(app.world().resource::<SelectedStop>().0.is_none());

        app.world_mut()
            .resource_mut::<NextState<Experience>>()
            .set(Experience::Globe);
        app.update();
        assert!(app.world().resource::<SelectedStop>().0.is_none());
    }
}
