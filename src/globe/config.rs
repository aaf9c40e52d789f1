use std::time::Duration;

use bevy::input::common_conditions::input_toggle_active;
use bevy::prelude::*;
use bevy_inspector_egui::inspector_options::std_options::NumberDisplay;
use bevy_inspector_egui::prelude::*;
use bevy_inspector_egui::quick::ResourceInspectorPlugin;

use super::constants::CLAMP_FLIGHT_MS;
use super::constants::LOOK_SENSITIVITY;
use super::constants::MIN_CAMERA_HEIGHT;
use super::constants::OVERVIEW_FLIGHT_MS;
use super::constants::OVERVIEW_HOME_HEIGHT;
use super::constants::OVERVIEW_MAX_ZOOM;
use super::constants::OVERVIEW_MIN_ZOOM;
use super::constants::ROTATE_SENSITIVITY;
use super::constants::ROUTE_MIN_VISIBLE_HEIGHT;
use super::constants::ROUTE_SEGMENT_DELAY_MS;
use super::constants::TRANSITION_MAX_ZOOM;
use super::constants::TRANSITION_MIN_ZOOM;
use super::constants::TRANSLATE_SENSITIVITY;
use super::constants::VENUE_FLIGHT_MS;
use super::constants::VENUE_MAX_ZOOM;
use super::constants::VENUE_MIN_ZOOM;
use super::constants::WHEEL_SETTLE_MS;
use super::constants::ZOOM_SENSITIVITY;
use super::constraints::CameraMode;
use super::constraints::ZoomBounds;

pub struct GlobeConfigPlugin;

impl Plugin for GlobeConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(
            ResourceInspectorPlugin::<GlobeConfig>::default()
                .run_if(input_toggle_active(false, KeyCode::F1)),
        )
        .init_resource::<GlobeConfig>();
    }
}

#[derive(Resource, Reflect, InspectorOptions, Debug, PartialEq, Clone, Copy)]
#[reflect(Resource, InspectorOptions)]
pub struct GlobeConfig {
    pub venue_min_zoom:         f64,
    pub venue_max_zoom:         f64,
    pub overview_min_zoom:      f64,
    pub overview_max_zoom:      f64,
    /// Height the venue-lock surface correction restores
    pub min_camera_height:      f64,
    pub overview_home_height:   f64,
    pub route_min_height:       f64,
    #[inspector(min = 0.0, max = 1000.0, display = NumberDisplay::Slider)]
    pub wheel_settle_ms:        f32,
    #[inspector(min = 0.0, max = 2000.0, display = NumberDisplay::Slider)]
    pub clamp_flight_ms:        f32,
    #[inspector(min = 0.0, max = 6000.0, display = NumberDisplay::Slider)]
    pub venue_flight_ms:        f32,
    #[inspector(min = 0.0, max = 6000.0, display = NumberDisplay::Slider)]
    pub overview_flight_ms:     f32,
    #[inspector(min = 0.0, max = 1000.0, display = NumberDisplay::Slider)]
    pub route_segment_delay_ms: f32,
    #[inspector(min = 0.0, max = 0.02, display = NumberDisplay::Slider)]
    pub rotate_sensitivity:     f32,
    #[inspector(min = 0.0, max = 0.02, display = NumberDisplay::Slider)]
    pub look_sensitivity:       f32,
    #[inspector(min = 0.0, max = 0.01, display = NumberDisplay::Slider)]
    pub translate_sensitivity:  f32,
    #[inspector(min = 0.0, max = 0.5, display = NumberDisplay::Slider)]
    pub zoom_sensitivity:       f32,
}

impl Default for GlobeConfig {
    fn default() -> Self {
        Self {
            venue_min_zoom:         VENUE_MIN_ZOOM,
            venue_max_zoom:         VENUE_MAX_ZOOM,
            overview_min_zoom:      OVERVIEW_MIN_ZOOM,
            overview_max_zoom:      OVERVIEW_MAX_ZOOM,
            min_camera_height:      MIN_CAMERA_HEIGHT,
            overview_home_height:   OVERVIEW_HOME_HEIGHT,
            route_min_height:       ROUTE_MIN_VISIBLE_HEIGHT,
            wheel_settle_ms:        WHEEL_SETTLE_MS,
            clamp_flight_ms:        CLAMP_FLIGHT_MS,
            venue_flight_ms:        VENUE_FLIGHT_MS,
            overview_flight_ms:     OVERVIEW_FLIGHT_MS,
            route_segment_delay_ms: ROUTE_SEGMENT_DELAY_MS,
            rotate_sensitivity:     ROTATE_SENSITIVITY,
            look_sensitivity:       LOOK_SENSITIVITY,
            translate_sensitivity:  TRANSLATE_SENSITIVITY,
            zoom_sensitivity:       ZOOM_SENSITIVITY,
        }
    }
}

impl GlobeConfig {
    pub fn bounds_for(&self, mode: CameraMode) -> ZoomBounds {
        match mode {
            CameraMode::Overview => ZoomBounds::new(self.overview_min_zoom, self.overview_max_zoom),
            CameraMode::Venue => ZoomBounds::new(self.venue_min_zoom, self.venue_max_zoom),
            CameraMode::Transition => ZoomBounds::new(TRANSITION_MIN_ZOOM, TRANSITION_MAX_ZOOM),
        }
    }

    pub fn wheel_settle(&self) -> Duration { Duration::from_secs_f32(self.wheel_settle_ms / 1000.0) }
}
