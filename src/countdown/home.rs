use bevy::prelude::*;
use chrono::DateTime;
use chrono::Utc;

use super::config::CountdownConfig;
use super::constants::BODY_FONT_SIZE;
use super::constants::CARD_BACKGROUND;
use super::constants::CARD_BACKGROUND_HOVERED;
use super::constants::CARD_BACKGROUND_LOCKED;
use super::constants::COUNTDOWN_TICK_SECONDS;
use super::constants::DAY_CARD_MIN_HEIGHT;
use super::constants::DAY_CARD_WIDTH;
use super::constants::GOLD;
use super::constants::HERO_TITLE;
use super::constants::HERO_TITLE_FONT_SIZE;
use super::constants::MUTED_GOLD;
use super::constants::NEAR_BLACK;
use super::constants::SMALL_FONT_SIZE;
use super::constants::SOFT_GOLD;
use super::constants::TEXT_WHITE;
use super::content::DayCatalog;
use super::content::DayData;
use super::day_page::OpenDay;
use super::ticker::PeriodicTask;
use super::ticker::Tick;
use super::unlock::TimeUntilUnlock;
use super::unlock::UnlockSchedule;
use super::widgets::CountdownDigit;
use super::widgets::label;
use super::widgets::spawn_hero_row;
use super::widgets::two_digits;
use crate::state::Screen;

pub struct HomePlugin;

impl Plugin for HomePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Screen::Home), spawn_home)
            .add_systems(
                Update,
                handle_card_interaction.run_if(in_state(Screen::Home)),
            );
    }
}

#[derive(Component)]
pub struct HomeScreen;

#[derive(Component, Debug)]
struct DayCard {
    day:      u32,
    unlocked: bool,
}

/// Text lines on a card that change when the day unlocks
#[derive(Component, Debug, Clone, Copy)]
enum CardLine {
    Status(u32),
    Remaining(u32),
}

const fn card_background(unlocked: bool) -> Color {
    if unlocked {
        CARD_BACKGROUND
    } else {
        CARD_BACKGROUND_LOCKED
    }
}

fn spawn_home(
    mut commands: Commands,
    schedule: Res<UnlockSchedule>,
    catalog: Res<DayCatalog>,
) {
    debug!("spawning home screen");
    commands
        .spawn((
            HomeScreen,
            Name::new("HomeScreen"),
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Val::Px(24.0),
                padding: UiRect::all(Val::Px(32.0)),
                overflow: Overflow::clip_y(),
                ..default()
            },
            BackgroundColor(NEAR_BLACK),
        ))
        .with_children(|parent| {
            parent
                .spawn((Name::new("HomeTicker"), PeriodicTask::every(COUNTDOWN_TICK_SECONDS)))
                .observe(refresh_home);

            parent.spawn(label(HERO_TITLE, HERO_TITLE_FONT_SIZE, SOFT_GOLD));
            spawn_hero_row(parent);

            parent
                .spawn(Node {
                    flex_wrap: FlexWrap::Wrap,
                    justify_content: JustifyContent::Center,
                    column_gap: Val::Px(16.0),
                    row_gap: Val::Px(16.0),
                    max_width: Val::Px(1280.0),
                    ..default()
                })
                .with_children(|grid| {
                    for day in catalog.iter() {
                        spawn_day_card(grid, &schedule, day);
                    }
                });
        });
}

fn spawn_day_card(grid: &mut ChildSpawnerCommands, schedule: &UnlockSchedule, day: &DayData) {
    let number = day.day_number;
    let date = schedule
        .unlock_date(number)
        .map(|date| date.format("%B %-d").to_string())
        .unwrap_or_default();

    grid.spawn((
        DayCard {
            day:      number,
            unlocked: false,
        },
        Name::new(format!("DayCard {number}")),
        Button,
        Node {
            width: Val::Px(DAY_CARD_WIDTH),
            min_height: Val::Px(DAY_CARD_MIN_HEIGHT),
            flex_direction: FlexDirection::Column,
            row_gap: Val::Px(6.0),
            padding: UiRect::all(Val::Px(14.0)),
            border: UiRect::all(Val::Px(1.0)),
            ..default()
        },
        BorderColor::all(MUTED_GOLD),
        BackgroundColor(card_background(false)),
    ))
    .with_children(|card| {
        card.spawn(label(format!("Day {number}"), SMALL_FONT_SIZE, GOLD));
        card.spawn(label(day.title.clone(), BODY_FONT_SIZE, TEXT_WHITE));
        card.spawn(label(day.subtitle.clone(), SMALL_FONT_SIZE, MUTED_GOLD));
        card.spawn(label(date, SMALL_FONT_SIZE, SOFT_GOLD));
        card.spawn((CardLine::Status(number), label("", SMALL_FONT_SIZE, GOLD)));
        card.spawn((CardLine::Remaining(number), label("", SMALL_FONT_SIZE, MUTED_GOLD)));
    });
}

/// Status and remaining-time lines for a card at `now`.
fn card_lines(
    schedule: &UnlockSchedule,
    day: &DayData,
    now: DateTime<Utc>,
) -> (String, String) {
    let number = day.day_number;
    match schedule.time_until_unlock(number, now) {
        Ok(remaining) if remaining.is_unlocked => (day.item_count_label(), String::new()),
        Ok(remaining) => (
            format!(
                "Unlocks {}",
                schedule.format_unlock_instant(number).unwrap_or_default()
            ),
            remaining_line(&remaining),
        ),
        Err(e) => {
            warn!("Day card {number} has no unlock instant: {e}");
            (String::new(), String::new())
        },
    }
}

// under a minute there is no compact component to show
fn remaining_line(remaining: &TimeUntilUnlock) -> String {
    let compact = remaining.compact();
    if compact.is_empty() {
        "remaining".to_string()
    } else {
        format!("{compact} remaining")
    }
}

fn refresh_home(
    _tick: On<Tick>,
    schedule: Res<UnlockSchedule>,
    catalog: Res<DayCatalog>,
    config: Res<CountdownConfig>,
    mut digits: Query<(&CountdownDigit, &mut Text), Without<CardLine>>,
    mut lines: Query<(&CardLine, &mut Text), Without<CountdownDigit>>,
    mut cards: Query<(&mut DayCard, &mut BackgroundColor)>,
) {
    let now = config.now();

    let remaining = match schedule.final_target() {
        Ok(target) => TimeUntilUnlock::between(&now.with_timezone(&schedule.zone()), &target),
        Err(e) => {
            warn!("No final countdown target: {e}");
            TimeUntilUnlock::UNLOCKED
        },
    };
    for (digit, mut text) in &mut digits {
        text.0 = two_digits(digit.0.value(&remaining));
    }

    for (mut card, mut background) in &mut cards {
        let unlocked = schedule.is_unlocked(card.day, now).unwrap_or(false);
        if card.unlocked != unlocked {
            card.unlocked = unlocked;
            background.0 = card_background(unlocked);
        }
    }

    for (line, mut text) in &mut lines {
        let (CardLine::Status(day) | CardLine::Remaining(day)) = *line;
        let Some(data) = catalog.get(day) else {
            continue;
        };
        let (status, remaining) = card_lines(&schedule, data, now);
        text.0 = match line {
            CardLine::Status(_) => status,
            CardLine::Remaining(_) => remaining,
        };
    }
}

fn handle_card_interaction(
    mut commands: Commands,
    mut cards: Query<(&Interaction, &DayCard, &mut BackgroundColor), Changed<Interaction>>,
) {
    for (interaction, card, mut background) in &mut cards {
        match interaction {
            Interaction::Pressed if card.unlocked => {
                commands.trigger(OpenDay { day: card.day });
            },
            Interaction::Hovered if card.unlocked => background.0 = CARD_BACKGROUND_HOVERED,
            _ => background.0 = card_background(card.unlocked),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use chrono::TimeZone;

    use super::*;
    use crate::countdown::constants::TOTAL_DAYS;

    fn fixtures() -> (UnlockSchedule, DayCatalog) {
        let Ok(schedule) = UnlockSchedule::from_constants() else {
            panic!("constants must form a valid schedule");
        };
        let Ok(catalog) = DayCatalog::compiled(TOTAL_DAYS) else {
            panic!("compiled content must be valid");
        };
        (schedule, catalog)
    }

    fn utc(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
        match Utc.with_ymd_and_hms(year, month, day, hour, minute, 0).single() {
            Some(instant) => instant,
            None => panic!("valid instant"),
        }
    }

    #[test]
    fn locked_card_shows_unlock_instant_and_remaining_time() {
        let (schedule, catalog) = fixtures();
        let Some(day_two) = catalog.get(2) else {
            panic!("day 2 exists");
        };
        // 9:44 UTC on Jan 31 is 4:44 EST, exactly day 1's unlock
        let (status, remaining) = card_lines(&schedule, day_two, utc(2026, 1, 31, 9, 44));
        assert_eq!(status, "Unlocks February 1, 2026 at 4:44 AM EST");
        assert_eq!(remaining, "1d remaining");
    }

    #[test]
    fn unlocked_card_shows_item_count() {
        let (schedule, catalog) = fixtures();
        let Some(day_one) = catalog.get(1) else {
            panic!("day 1 exists");
        };
        let (status, remaining) = card_lines(&schedule, day_one, utc(2026, 1, 31, 9, 44));
        assert_eq!(status, day_one.item_count_label());
        assert!(remaining.is_empty());
    }

    #[test]
    fn last_minute_shows_remaining_without_a_leading_space() {
        let (schedule, catalog) = fixtures();
        let Some(day_two) = catalog.get(2) else {
            panic!("day 2 exists");
        };
        // 30 seconds before day 2 unlocks at 9:44 UTC on Feb 1
        let now = utc(2026, 2, 1, 9, 43) + TimeDelta::seconds(30);
        let (_, remaining) = card_lines(&schedule, day_two, now);
        assert_eq!(remaining, "remaining");
    }
}
