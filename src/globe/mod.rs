mod config;
mod constants;
mod constraints;
mod controller;
mod error;
mod flight;
mod geodesy;
mod markers;
mod panel;
mod route;
mod scene;
mod selection;
mod stops;
mod venue_lock;

use bevy::prelude::*;
pub use scene::GlobeScene;

use self::config::GlobeConfigPlugin;
use self::constraints::ConstraintsPlugin;
use self::controller::ControllerPlugin;
use self::flight::FlightPlugin;
use self::geodesy::ReferenceSphere;
use self::markers::MarkersPlugin;
use self::panel::PanelPlugin;
use self::route::RoutePlugin;
use self::scene::ScenePlugin;
use self::selection::SelectionPlugin;
use self::stops::SelectedStop;
use self::stops::TourStops;
use self::venue_lock::VenueLockPlugin;

pub struct GlobePlugin;

impl Plugin for GlobePlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(GlobeConfigPlugin)
            .init_resource::<ReferenceSphere>()
            .init_resource::<SelectedStop>();

        match TourStops::compiled() {
            Ok(stops) => {
                info!(
                    "tour loaded: {} stops, {} on the globe",
                    stops.iter().count(),
                    stops.located().count()
                );
                app.insert_resource(stops).add_plugins((
                    ControllerPlugin,
                    ConstraintsPlugin,
                    VenueLockPlugin,
                    FlightPlugin,
                    ScenePlugin,
                    MarkersPlugin,
                    RoutePlugin,
                    PanelPlugin,
                    SelectionPlugin,
                ));
            },
            Err(e) => {
                error!("Globe cannot start: {e}");
                app.add_systems(Startup, exit_with_error);
            },
        }
    }
}

fn exit_with_error(mut exit: MessageWriter<AppExit>) { exit.write(AppExit::error()); }
