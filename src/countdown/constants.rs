//! Constants for the countdown module
//! The unlock schedule is fixed at build time; presentation values live here too.

use bevy::color::Color;
use chrono_tz::Tz;

// =============================================================================
// Unlock Schedule
// =============================================================================

/// Named time zone every unlock instant is evaluated in
pub const TIMEZONE: Tz = Tz::America__New_York;

/// Calendar date of day 1
pub const START_YEAR: i32 = 2026;
pub const START_MONTH: u32 = 1;
pub const START_DAY: u32 = 31;

/// Local wall-clock time at which each day unlocks
pub const UNLOCK_HOUR: u32 = 4;
pub const UNLOCK_MINUTE: u32 = 44;

/// Number of content days; the last day's unlock is the final countdown target
pub const TOTAL_DAYS: u32 = 15;

// =============================================================================
// Persistence
// =============================================================================

/// Storage key holding the JSON array of revealed day numbers
pub const REVEALED_DAYS_KEY: &str = "valentine-revealed-days";

// =============================================================================
// Timing
// =============================================================================

/// Period of the countdown refresh task
pub const COUNTDOWN_TICK_SECONDS: f32 = 1.0;

/// Delay between consecutive revealed items
pub const REVEAL_ITEM_STAGGER_MS: f32 = 50.0;

// =============================================================================
// Presentation
// =============================================================================

pub const GOLD: Color = Color::srgb(0.839, 0.698, 0.369);
pub const SOFT_GOLD: Color = Color::srgb(0.906, 0.820, 0.655);
pub const MUTED_GOLD: Color = Color::srgba(0.906, 0.820, 0.655, 0.55);
pub const NEAR_BLACK: Color = Color::srgb(0.047, 0.047, 0.055);
pub const CARD_BACKGROUND: Color = Color::srgb(0.075, 0.070, 0.080);
pub const CARD_BACKGROUND_LOCKED: Color = Color::srgb(0.055, 0.052, 0.060);
pub const CARD_BACKGROUND_HOVERED: Color = Color::srgb(0.110, 0.098, 0.090);
pub const TEXT_WHITE: Color = Color::srgb(0.96, 0.95, 0.93);

pub const HERO_TITLE: &str = "Until Valentine's Day";
pub const HERO_TITLE_FONT_SIZE: f32 = 44.0;
pub const HERO_DIGIT_FONT_SIZE: f32 = 52.0;
pub const HEADING_FONT_SIZE: f32 = 30.0;
pub const BODY_FONT_SIZE: f32 = 16.0;
pub const SMALL_FONT_SIZE: f32 = 12.0;

pub const DAY_CARD_WIDTH: f32 = 230.0;
pub const DAY_CARD_MIN_HEIGHT: f32 = 170.0;
