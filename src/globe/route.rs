use std::time::Duration;

use bevy::math::DVec3;
use bevy::prelude::*;

use super::config::GlobeConfig;
use super::constants::ROUTE_ALTITUDE;
use super::constants::ROUTE_ARC_SAMPLES;
use super::constants::ROUTE_COLOR;
use super::controller::GlobeCamera;
use super::geodesy::ReferenceSphere;
use super::geodesy::great_circle_points;
use super::geodesy::to_render;
use super::stops::TourStops;
use crate::schedule::GlobeSet;
use crate::stagger::staggered_count;
use crate::state::Experience;

pub struct RoutePlugin;

impl Plugin for RoutePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Experience::Globe), build_route)
            .add_systems(OnExit(Experience::Globe), remove_route)
            .add_systems(
                Update,
                draw_route
                    .run_if(resource_exists::<TourRoute>)
                    .in_set(GlobeSet::Presentation),
            );
    }
}

/// Great-circle arcs between consecutive located stops, revealed one at a time.
#[derive(Resource, Debug, Clone)]
pub struct TourRoute {
    arcs:    Vec<Vec<DVec3>>,
    started: Duration,
}

/// One arc per pair of consecutive stops that both have coordinates.
pub fn route_arcs(stops: &TourStops, sphere: &ReferenceSphere) -> Vec<Vec<DVec3>> {
    let located: Vec<_> = stops.located().map(|(_, position)| position).collect();
    located
        .windows(2)
        .map(|pair| great_circle_points(sphere, pair[0], pair[1], ROUTE_ALTITUDE, ROUTE_ARC_SAMPLES))
        .collect()
}

fn build_route(
    mut commands: Commands,
    time: Res<Time>,
    stops: Res<TourStops>,
    sphere: Res<ReferenceSphere>,
) {
    let arcs = route_arcs(&stops, &sphere);
    debug!("tour route has {} segments", arcs.len());
    commands.insert_resource(TourRoute {
        arcs,
        started: time.elapsed(),
    });
}

fn remove_route(mut commands: Commands) { commands.remove_resource::<TourRoute>(); }

fn draw_route(
    mut gizmos: Gizmos,
    time: Res<Time>,
    config: Res<GlobeConfig>,
    sphere: Res<ReferenceSphere>,
    route: Res<TourRoute>,
    cameras: Query<&GlobeCamera>,
) {
    let Ok(camera) = cameras.single() else {
        return;
    };
    if sphere.height_of(camera.position) <= config.route_min_height {
        return;
    }

    let elapsed_ms = time.elapsed().saturating_sub(route.started).as_secs_f32() * 1000.0;
    let visible = staggered_count(elapsed_ms, config.route_segment_delay_ms, route.arcs.len());
    for arc in route.arcs.iter().take(visible) {
        gizmos.linestrip(arc.iter().copied().map(to_render), ROUTE_COLOR);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_without_coordinates_are_skipped() {
        let Ok(stops) = TourStops::compiled() else {
            panic!("compiled stops must parse");
        };
        let arcs = route_arcs(&stops, &ReferenceSphere::default());
        assert_eq!(arcs.len(), stops.located().count() - 1);
        assert!(arcs.iter().all(|arc| arc.len() == ROUTE_ARC_SAMPLES + 1));
    }

    #[test]
    fn arcs_join_consecutive_stops() {
        let sphere = ReferenceSphere::default();
        let Ok(stops) = TourStops::compiled() else {
            panic!("compiled stops must parse");
        };
        let arcs = route_arcs(&stops, &sphere);
        let located: Vec<_> = stops.located().map(|(_, position)| position).collect();
        for (arc, pair) in arcs.iter().zip(located.windows(2)) {
            let start = sphere.surface_point(pair[0]).normalize() * (sphere.radius + ROUTE_ALTITUDE);
            let Some(first) = arc.first() else {
                panic!("arcs are never empty");
            };
            assert!(first.distance(start) < 1e-3);
        }
    }
}
