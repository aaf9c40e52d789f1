//! Small UI building blocks shared by the home and day screens.

use bevy::prelude::*;

use super::constants::GOLD;
use super::constants::HERO_DIGIT_FONT_SIZE;
use super::constants::MUTED_GOLD;
use super::constants::SMALL_FONT_SIZE;
use super::unlock::TimeUntilUnlock;

pub fn label(value: impl Into<String>, font_size: f32, color: Color) -> impl Bundle {
    (
        Text::new(value),
        TextFont {
            font_size,
            ..default()
        },
        TextColor(color),
    )
}

/// One column of a live countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl CountdownUnit {
    pub const ALL: [Self; 4] = [Self::Days, Self::Hours, Self::Minutes, Self::Seconds];

    pub const fn caption(self) -> &'static str {
        match self {
            Self::Days => "Days",
            Self::Hours => "Hours",
            Self::Minutes => "Minutes",
            Self::Seconds => "Seconds",
        }
    }

    pub const fn value(self, remaining: &TimeUntilUnlock) -> u32 {
        match self {
            Self::Days => remaining.days,
            Self::Hours => remaining.hours,
            Self::Minutes => remaining.minutes,
            Self::Seconds => remaining.seconds,
        }
    }
}

/// Digit text of a countdown column
#[derive(Component, Debug, Clone, Copy)]
pub struct CountdownDigit(pub CountdownUnit);

/// The node holding a column; hidden for a zero day count on the day screen
#[derive(Component, Debug, Clone, Copy)]
pub struct CountdownColumn(pub CountdownUnit);

pub fn two_digits(value: u32) -> String { format!("{value:02}") }

/// Day-screen countdowns drop the days column once it reaches zero.
pub fn column_display(unit: CountdownUnit, remaining: &TimeUntilUnlock, hide_zero_days: bool) -> Display {
    if hide_zero_days && unit == CountdownUnit::Days && remaining.days == 0 {
        Display::None
    } else {
        Display::Flex
    }
}

pub fn spawn_countdown_row(
    parent: &mut ChildSpawnerCommands,
    digit_size: f32,
    initial: &TimeUntilUnlock,
    hide_zero_days: bool,
) {
    parent
        .spawn(Node {
            column_gap: Val::Px(28.0),
            ..default()
        })
        .with_children(|row| {
            for unit in CountdownUnit::ALL {
                row.spawn((
                    CountdownColumn(unit),
                    Node {
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        min_width: Val::Px(digit_size * 1.6),
                        display: column_display(unit, initial, hide_zero_days),
                        ..default()
                    },
                ))
                .with_children(|column| {
                    column.spawn((
                        CountdownDigit(unit),
                        label(two_digits(unit.value(initial)), digit_size, GOLD),
                    ));
                    column.spawn(label(unit.caption(), SMALL_FONT_SIZE, MUTED_GOLD));
                });
            }
        });
}

pub fn spawn_hero_row(parent: &mut ChildSpawnerCommands) {
    spawn_countdown_row(parent, HERO_DIGIT_FONT_SIZE, &TimeUntilUnlock::default(), false);
}
