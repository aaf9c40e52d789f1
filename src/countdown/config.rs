use bevy::input::common_conditions::input_toggle_active;
use bevy::prelude::*;
use bevy_inspector_egui::inspector_options::std_options::NumberDisplay;
use bevy_inspector_egui::prelude::*;
use bevy_inspector_egui::quick::ResourceInspectorPlugin;
use chrono::DateTime;
use chrono::TimeDelta;
use chrono::Utc;

use super::constants::REVEAL_ITEM_STAGGER_MS;

pub struct CountdownConfigPlugin;

impl Plugin for CountdownConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(
            ResourceInspectorPlugin::<CountdownConfig>::default()
                .run_if(input_toggle_active(false, KeyCode::F2)),
        )
        .init_resource::<CountdownConfig>();
    }
}

#[derive(Resource, Reflect, InspectorOptions, Debug, PartialEq, Clone, Copy)]
#[reflect(Resource, InspectorOptions)]
pub struct CountdownConfig {
    /// Added to the system clock for every unlock check; lets future days be previewed
    #[inspector(min = -720.0, max = 720.0)]
    pub clock_offset_hours: f32,
    #[inspector(min = 0.0, max = 500.0, display = NumberDisplay::Slider)]
    pub reveal_stagger_ms:  f32,
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            clock_offset_hours: 0.0,
            reveal_stagger_ms:  REVEAL_ITEM_STAGGER_MS,
        }
    }
}

impl CountdownConfig {
    pub fn now(&self) -> DateTime<Utc> { self.shifted(Utc::now()) }

    pub fn shifted(&self, instant: DateTime<Utc>) -> DateTime<Utc> {
        #[allow(
            clippy::cast_possible_truncation,
            reason = "offset is bounded to +/-720 hours by the inspector"
        )]
        let offset_ms = (f64::from(self.clock_offset_hours) * 3_600_000.0).round() as i64;
        instant + TimeDelta::milliseconds(offset_ms)
    }
}
