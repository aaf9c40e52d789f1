//! Constants for the globe module
//! Distances are meters in the globe frame (origin at the sphere's center, +Y north).

use bevy::color::Color;

// =============================================================================
// Reference Surface
// =============================================================================

/// WGS84 semi-major axis; the globe is a sphere of this radius
pub const WGS84_A: f64 = 6_378_137.0;

/// Render units per meter; keeps the globe inside f32 precision for rendering
pub const RENDER_SCALE: f64 = 1.0e-3;

// =============================================================================
// Zoom Bounds
// =============================================================================

/// Venue mode, measured from the tracked venue
pub const VENUE_MIN_ZOOM: f64 = 500.0;
pub const VENUE_MAX_ZOOM: f64 = 1_000.0;

/// Overview mode, measured from the nearest surface point
pub const OVERVIEW_MIN_ZOOM: f64 = 2_000_000.0;
pub const OVERVIEW_MAX_ZOOM: f64 = 30_000_000.0;

pub const TRANSITION_MIN_ZOOM: f64 = 1.0;
pub const TRANSITION_MAX_ZOOM: f64 = f64::INFINITY;

// =============================================================================
// Timing
// =============================================================================

pub const WHEEL_SETTLE_MS: f32 = 150.0;
pub const CLAMP_FLIGHT_MS: f32 = 300.0;
pub const VENUE_FLIGHT_MS: f32 = 2_000.0;
pub const OVERVIEW_FLIGHT_MS: f32 = 2_000.0;
pub const ROUTE_SEGMENT_DELAY_MS: f32 = 200.0;

// =============================================================================
// Camera
// =============================================================================

/// Height the surface correction restores while a venue is locked
pub const MIN_CAMERA_HEIGHT: f64 = 1.0;

/// Height kept by the controller's own collision detection
pub const COLLISION_MARGIN: f64 = 10.0;

/// Overview home: camera height above the surface, looking at the globe's center
pub const OVERVIEW_HOME_HEIGHT: f64 = 20_000_000.0;
pub const OVERVIEW_HOME_LAT_DEG: f64 = 40.0;
pub const OVERVIEW_HOME_LON_DEG: f64 = -95.0;

/// Where the camera parks relative to a selected venue
pub const VENUE_STANDOFF_DISTANCE: f64 = 750.0;
pub const VENUE_STANDOFF_ELEVATION_DEG: f64 = 35.0;

/// Orbit elevation limit relative to the focus' horizon
pub const ELEVATION_LIMIT_DEG: f64 = 85.0;

pub const CAMERA_FOV_DEG: f32 = 45.0;
pub const CAMERA_NEAR: f32 = 0.000_5;
pub const CAMERA_FAR: f32 = 200_000.0;

// =============================================================================
// Input
// =============================================================================

pub const ROTATE_SENSITIVITY: f32 = 0.005;
pub const LOOK_SENSITIVITY: f32 = 0.002;
pub const TRANSLATE_SENSITIVITY: f32 = 0.0015;
pub const ZOOM_SENSITIVITY: f32 = 0.12;

/// Pixel-unit scroll deltas are divided by this to compare with line units
pub const PIXELS_PER_SCROLL_LINE: f32 = 100.0;

// =============================================================================
// Route and Markers
// =============================================================================

/// The route is drawn only while the camera is above this height
pub const ROUTE_MIN_VISIBLE_HEIGHT: f64 = 800_000.0;

/// Route arcs float this far above the surface so they are not hidden by it
pub const ROUTE_ALTITUDE: f64 = 15_000.0;
pub const ROUTE_ARC_SAMPLES: usize = 64;

pub const MARKER_SIZE: f32 = 12.0;
pub const SELECTED_MARKER_SIZE: f32 = 18.0;
pub const MARKER_HOVER_SCALE: f32 = 1.1;

pub const CHAMPAGNE: Color = Color::srgb(0.969, 0.906, 0.808);
pub const MARKER_COLOR: Color = Color::srgb(0.85, 0.85, 0.88);
pub const MARKER_BORDER: Color = Color::srgb(0.08, 0.08, 0.10);
pub const ROUTE_COLOR: Color = Color::srgba(0.906, 0.820, 0.655, 0.85);
pub const PANEL_BACKGROUND: Color = Color::srgba(0.05, 0.05, 0.06, 0.82);
pub const PANEL_HOVERED: Color = Color::srgba(0.16, 0.14, 0.12, 0.9);
pub const PANEL_TEXT: Color = Color::srgb(0.96, 0.95, 0.93);
pub const PANEL_MUTED: Color = Color::srgba(0.906, 0.820, 0.655, 0.65);
pub const FALLBACK_OCEAN: Color = Color::srgb(0.07, 0.20, 0.42);
pub const SPACE_COLOR: Color = Color::srgb(0.01, 0.01, 0.02);

pub const GLOBE_TEXTURE: &str = "textures/earth_daymap.png";
pub const GLOBE_LON_SEGMENTS: u32 = 128;
pub const GLOBE_LAT_SEGMENTS: u32 = 64;
