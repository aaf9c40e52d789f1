use bevy::prelude::*;

use crate::state::Experience;

/// Per-frame order of the globe camera pipeline.
#[derive(Debug, Hash, PartialEq, Eq, Clone, SystemSet)]
pub enum GlobeSet {
    /// Mouse, keyboard and UI presses
    Input,
    /// Follow the locked venue
    Tracking,
    /// Debounced wheel clamp
    Constraints,
    Flight,
    /// Surface correction while locked
    Correction,
    /// `GlobeCamera` -> `Transform`
    Sync,
    /// Markers, route and panel
    Presentation,
}

pub struct SchedulePlugin;

impl Plugin for SchedulePlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                GlobeSet::Input,
                GlobeSet::Tracking,
                GlobeSet::Constraints,
                GlobeSet::Flight,
                GlobeSet::Correction,
                GlobeSet::Sync,
                GlobeSet::Presentation,
            )
                .chain()
                // every globe system comes along for the ride: none of them run
                // while the countdown is on screen
                .run_if(in_state(Experience::Globe)),
        );
    }
}
