//! Swan Tour - a daily-unlock countdown and a tour globe built with Bevy 0.18
//!
//! Two experiences, switched with `Tab`:
//! - Countdown: one day of content unlocks at a fixed local time each day, with a reveal
//!   animation that is remembered across runs
//! - Globe: tour stops on a textured globe, with camera flights and a venue lock
//!
//! Pass `globe` on the command line to start in the globe. Bevy Remote Protocol (BRP)
//! is enabled for inspection.

mod countdown;
mod despawn;
mod globe;
mod schedule;
mod stagger;
mod state;

use bevy::prelude::*;
use bevy_brp_extras::BrpExtrasPlugin;
use bevy_inspector_egui::bevy_egui::EguiPlugin;

use crate::countdown::CountdownPlugin;
use crate::despawn::DespawnPlugin;
use crate::globe::GlobePlugin;
use crate::schedule::SchedulePlugin;
use crate::state::Experience;
use crate::state::StatePlugin;

fn main() {
    let mut app = App::new();

    // Get effective port from BrpExtrasPlugin to include in window title if non-default
    let brp_plugin = BrpExtrasPlugin::default();
    let (effective_port, _) = brp_plugin.get_effective_port();
    let window_title = if effective_port == bevy_brp_extras::DEFAULT_REMOTE_PORT {
        "swan_tour".to_string()
    } else {
        format!("swan_tour - {effective_port}")
    };

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: window_title,
            ..default()
        }),
        ..default()
    }))
    // before StatePlugin so its `init_state` keeps the experience chosen here
    .insert_state(Experience::from_args(std::env::args()));

    app.add_plugins((
        EguiPlugin::default(),
        brp_plugin,
        StatePlugin,
        SchedulePlugin,
        DespawnPlugin,
        CountdownPlugin,
        GlobePlugin,
    ))
    .run();
}
