//! Day screen
//!
//! A locked day shows a live "unlocks in" countdown and rebuilds itself into the
//! reveal panel once its instant passes. An unlocked day shows its items, either all
//! at once when already revealed or one by one after the Reveal button is pressed.

use std::time::Duration;

use bevy::input::common_conditions::input_just_pressed;
use bevy::prelude::*;

use super::config::CountdownConfig;
use super::constants::BODY_FONT_SIZE;
use super::constants::CARD_BACKGROUND;
use super::constants::CARD_BACKGROUND_HOVERED;
use super::constants::COUNTDOWN_TICK_SECONDS;
use super::constants::GOLD;
use super::constants::HEADING_FONT_SIZE;
use super::constants::MUTED_GOLD;
use super::constants::NEAR_BLACK;
use super::constants::SMALL_FONT_SIZE;
use super::constants::SOFT_GOLD;
use super::constants::TEXT_WHITE;
use super::content::DayCatalog;
use super::content::DayData;
use super::content::DayItem;
use super::storage::RevealedDays;
use super::ticker::PeriodicTask;
use super::ticker::Tick;
use super::unlock::TimeUntilUnlock;
use super::unlock::UnlockSchedule;
use super::widgets::CountdownColumn;
use super::widgets::CountdownDigit;
use super::widgets::column_display;
use super::widgets::label;
use super::widgets::spawn_countdown_row;
use super::widgets::two_digits;
use crate::stagger::staggered_count;
use crate::state::OnDayPage;
use crate::state::Screen;

pub struct DayPagePlugin;

impl Plugin for DayPagePlugin {
    fn build(&self, app: &mut App) {
        app.add_observer(open_day)
            .add_systems(OnEnter(OnDayPage), spawn_day_page)
            .add_systems(
                Update,
                (
                    handle_back_button,
                    return_home.run_if(input_just_pressed(KeyCode::Escape)),
                    handle_reveal_button,
                    handle_audio_buttons,
                    advance_reveal,
                )
                    .run_if(in_state(OnDayPage)),
            );
    }
}

/// Request to show a day; unknown days fall back to the home screen.
#[derive(Event, Debug, Clone, Copy)]
pub struct OpenDay {
    pub day: u32,
}

#[derive(Component)]
pub struct DayPage;

/// Container rebuilt whenever the day's locked state changes
#[derive(Component, Debug)]
struct DayBody {
    day:      u32,
    unlocked: Option<bool>,
}

#[derive(Component)]
struct BackButton;

#[derive(Component)]
struct RevealButton;

#[derive(Component, Debug)]
struct RevealPanel {
    day:        u32,
    item_count: usize,
    started:    Option<Duration>,
}

#[derive(Component, Debug)]
struct RevealItem {
    index: usize,
}

#[derive(Component, Debug)]
struct AudioButton {
    src: String,
}

fn open_day(open: On<OpenDay>, catalog: Res<DayCatalog>, mut next_screen: ResMut<NextState<Screen>>) {
    if catalog.get(open.day).is_none() {
        warn!("Day {} has no content, returning home", open.day);
        next_screen.set(Screen::Home);
        return;
    }
    debug!("opening day {}", open.day);
    next_screen.set(Screen::Day { number: open.day });
}

fn spawn_day_page(
    mut commands: Commands,
    screen: Res<State<Screen>>,
    schedule: Res<UnlockSchedule>,
    catalog: Res<DayCatalog>,
    mut next_screen: ResMut<NextState<Screen>>,
) {
    let Screen::Day { number } = *screen.get() else {
        return;
    };
    let Some(day) = catalog.get(number) else {
        warn!("Day {number} has no content, returning home");
        next_screen.set(Screen::Home);
        return;
    };

    let date = schedule
        .unlock_date(number)
        .map(|date| date.format("%A, %B %-d").to_string())
        .unwrap_or_default();

    commands
        .spawn((
            DayPage,
            Name::new(format!("DayPage {number}")),
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Val::Px(14.0),
                padding: UiRect::all(Val::Px(32.0)),
                ..default()
            },
            BackgroundColor(NEAR_BLACK),
        ))
        .with_children(|page| {
            page.spawn((BackButton, Button, button_node(), BackgroundColor(CARD_BACKGROUND)))
                .with_child(label("Back to Home", SMALL_FONT_SIZE, SOFT_GOLD));

            page.spawn(label(format!("Day {number}"), SMALL_FONT_SIZE, GOLD));
            page.spawn(label(date, SMALL_FONT_SIZE, MUTED_GOLD));
            page.spawn(label(day.title.clone(), HEADING_FONT_SIZE, TEXT_WHITE));
            page.spawn(label(day.subtitle.clone(), BODY_FONT_SIZE, SOFT_GOLD));

            page.spawn((
                DayBody {
                    day:      number,
                    unlocked: None,
                },
                Node {
                    flex_direction: FlexDirection::Column,
                    align_items: AlignItems::Center,
                    row_gap: Val::Px(12.0),
                    max_width: Val::Px(720.0),
                    ..default()
                },
            ));

            page.spawn((Name::new("DayTicker"), PeriodicTask::every(COUNTDOWN_TICK_SECONDS)))
                .observe(refresh_day_page);
        });
}

fn button_node() -> Node {
    Node {
        padding: UiRect::axes(Val::Px(16.0), Val::Px(8.0)),
        border: UiRect::all(Val::Px(1.0)),
        ..default()
    }
}

fn refresh_day_page(
    _tick: On<Tick>,
    mut commands: Commands,
    schedule: Res<UnlockSchedule>,
    catalog: Res<DayCatalog>,
    config: Res<CountdownConfig>,
    revealed: Res<RevealedDays>,
    asset_server: Res<AssetServer>,
    mut bodies: Query<(Entity, &mut DayBody)>,
    mut digits: Query<(&CountdownDigit, &mut Text)>,
    mut columns: Query<(&CountdownColumn, &mut Node)>,
) {
    let now = config.now();
    for (entity, mut body) in &mut bodies {
        let remaining = match schedule.time_until_unlock(body.day, now) {
            Ok(remaining) => remaining,
            Err(e) => {
                warn!("Day {} has no unlock instant: {e}", body.day);
                continue;
            },
        };

        if body.unlocked != Some(remaining.is_unlocked) {
            body.unlocked = Some(remaining.is_unlocked);
            let Some(day) = catalog.get(body.day) else {
                continue;
            };
            commands.entity(entity).despawn_related::<Children>();
            if remaining.is_unlocked {
                debug!("day {} unlocked, showing reveal panel", body.day);
                let already = revealed.is_revealed(body.day);
                commands
                    .entity(entity)
                    .with_children(|parent| spawn_reveal_panel(parent, &asset_server, day, already));
            } else {
                let unlocks = schedule.format_unlock_instant(body.day).unwrap_or_default();
                commands
                    .entity(entity)
                    .with_children(|parent| spawn_locked_body(parent, &unlocks, &remaining));
            }
            continue;
        }

        if !remaining.is_unlocked {
            for (digit, mut text) in &mut digits {
                text.0 = two_digits(digit.0.value(&remaining));
            }
            for (column, mut node) in &mut columns {
                node.display = column_display(column.0, &remaining, true);
            }
        }
    }
}

fn spawn_locked_body(
    parent: &mut ChildSpawnerCommands,
    unlocks: &str,
    remaining: &TimeUntilUnlock,
) {
    parent.spawn(label("Coming Soon", HEADING_FONT_SIZE, GOLD));
    parent.spawn(label(format!("Unlocks {unlocks}"), BODY_FONT_SIZE, SOFT_GOLD));
    parent.spawn(label("Unlocks in", SMALL_FONT_SIZE, MUTED_GOLD));
    spawn_countdown_row(parent, HEADING_FONT_SIZE, remaining, true);
}

fn spawn_reveal_panel(
    parent: &mut ChildSpawnerCommands,
    asset_server: &AssetServer,
    day: &DayData,
    already_revealed: bool,
) {
    parent
        .spawn((
            RevealPanel {
                day:        day.day_number,
                item_count: day.items.len(),
                started:    None,
            },
            Node {
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                row_gap: Val::Px(12.0),
                ..default()
            },
        ))
        .with_children(|panel| {
            if !already_revealed {
                panel
                    .spawn((RevealButton, Button, button_node(), BackgroundColor(CARD_BACKGROUND)))
                    .with_child(label("Reveal", BODY_FONT_SIZE, GOLD));
            }
            for (index, item) in day.items.iter().enumerate() {
                spawn_item(panel, asset_server, index, item, already_revealed);
            }
        });
}

fn spawn_item(
    parent: &mut ChildSpawnerCommands,
    asset_server: &AssetServer,
    index: usize,
    item: &DayItem,
    visible: bool,
) {
    let node = Node {
        flex_direction: FlexDirection::Column,
        align_items: AlignItems::Center,
        row_gap: Val::Px(4.0),
        display: if visible { Display::Flex } else { Display::None },
        ..default()
    };

    let mut entity = parent.spawn((RevealItem { index }, node));
    match item {
        DayItem::Text { value } => {
            entity.with_child(label(value.clone(), BODY_FONT_SIZE, TEXT_WHITE));
        },
        DayItem::Image { src, alt } => {
            let image = ImageNode::new(asset_server.load(src.clone()));
            let alt = alt.clone();
            entity.with_children(|item| {
                item.spawn((
                    image,
                    Node {
                        width: Val::Px(240.0),
                        height: Val::Px(240.0),
                        ..default()
                    },
                ));
                item.spawn(label(alt, SMALL_FONT_SIZE, MUTED_GOLD));
            });
        },
        DayItem::Audio { src, label: caption } => {
            let src = src.clone();
            let caption = caption.clone();
            entity.with_children(|item| {
                item.spawn((
                    AudioButton { src },
                    Button,
                    button_node(),
                    BackgroundColor(CARD_BACKGROUND),
                ))
                .with_child(label(format!("Play: {caption}"), BODY_FONT_SIZE, SOFT_GOLD));
            });
        },
        DayItem::Song {
            title,
            artist,
            link,
        } => {
            let heading = format!("{title} - {artist}");
            let link = link.clone();
            entity.with_children(|item| {
                item.spawn(label(heading, BODY_FONT_SIZE, GOLD));
                if let Some(link) = link {
                    item.spawn(label(link, SMALL_FONT_SIZE, MUTED_GOLD));
                }
            });
        },
    }
}

fn handle_back_button(
    buttons: Query<&Interaction, (Changed<Interaction>, With<BackButton>)>,
    mut next_screen: ResMut<NextState<Screen>>,
) {
    if buttons.iter().any(|interaction| *interaction == Interaction::Pressed) {
        next_screen.set(Screen::Home);
    }
}

fn return_home(mut next_screen: ResMut<NextState<Screen>>) { next_screen.set(Screen::Home); }

fn handle_reveal_button(
    mut commands: Commands,
    time: Res<Time>,
    mut revealed: ResMut<RevealedDays>,
    mut buttons: Query<
        (Entity, &Interaction, &ChildOf, &mut BackgroundColor),
        (Changed<Interaction>, With<RevealButton>),
    >,
    mut panels: Query<&mut RevealPanel>,
) {
    for (entity, interaction, child_of, mut background) in &mut buttons {
        match interaction {
            Interaction::Pressed => {
                let Ok(mut panel) = panels.get_mut(child_of.parent()) else {
                    continue;
                };
                revealed.mark_revealed(panel.day);
                panel.started = Some(time.elapsed());
                commands.entity(entity).despawn();
            },
            Interaction::Hovered => background.0 = CARD_BACKGROUND_HOVERED,
            Interaction::None => background.0 = CARD_BACKGROUND,
        }
    }
}

fn advance_reveal(
    time: Res<Time>,
    config: Res<CountdownConfig>,
    panels: Query<&RevealPanel>,
    mut items: Query<(&RevealItem, &mut Node)>,
) {
    for panel in &panels {
        let Some(started) = panel.started else {
            continue;
        };
        let elapsed_ms = time.elapsed().saturating_sub(started).as_secs_f32() * 1000.0;
        let shown = staggered_count(elapsed_ms, config.reveal_stagger_ms, panel.item_count);
        for (item, mut node) in &mut items {
            if item.index < shown && node.display == Display::None {
                node.display = Display::Flex;
            }
        }
    }
}

fn handle_audio_buttons(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    buttons: Query<(&Interaction, &AudioButton), Changed<Interaction>>,
) {
    for (interaction, button) in &buttons {
        if *interaction == Interaction::Pressed {
            debug!("playing {}", button.src);
            commands.spawn((
                AudioPlayer::new(asset_server.load(button.src.clone())),
                PlaybackSettings::DESPAWN,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use bevy::asset::AssetPlugin;
    use bevy::ecs::query::QueryFilter;
    use bevy::state::app::StatesPlugin;
    use bevy::time::TimeUpdateStrategy;
    use chrono::DateTime;
    use chrono::TimeDelta;
    use chrono::Utc;

    use super::*;
    use crate::countdown::constants::REVEALED_DAYS_KEY;
    use crate::countdown::constants::TOTAL_DAYS;
    use crate::countdown::storage::memory::MemoryStore;
    use crate::countdown::ticker::TickerPlugin;
    use crate::state::Experience;

    fn app() -> App {
        let mut app = App::new();
        let Ok(catalog) = DayCatalog::compiled(TOTAL_DAYS) else {
            panic!("compiled content must be valid");
        };
        app.add_plugins((MinimalPlugins, StatesPlugin))
            .init_state::<Experience>()
            .add_sub_state::<Screen>()
            .insert_resource(catalog)
            .add_observer(open_day);
        app.update();
        app
    }

    fn current_screen(app: &App) -> Screen { *app.world().resource::<State<Screen>>().get() }

    #[test]
    fn opening_a_known_day_switches_screens() {
        let mut app = app();
        app.world_mut().trigger(OpenDay { day: 3 });
        app.update();
        assert_eq!(current_screen(&app), Screen::Day { number: 3 });
    }

    #[test]
    fn opening_an_unknown_day_redirects_home() {
        let mut app = app();
        app.world_mut().trigger(OpenDay { day: 99 });
        app.update();
        assert_eq!(current_screen(&app), Screen::Home);
    }

    // day one holds five text items
    const DAY_ONE_ITEMS: usize = 5;

    fn day_one_unlock() -> DateTime<Utc> {
        let Ok(schedule) = UnlockSchedule::from_constants() else {
            panic!("constants describe a valid schedule");
        };
        let Ok(instant) = schedule.unlock_instant(1) else {
            panic!("day one has an unlock instant");
        };
        instant.with_timezone(&Utc)
    }

    /// Clock offset that makes the effective now land on `target`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_precision_loss,
        reason = "offsets span a few thousand hours"
    )]
    fn offset_to(target: DateTime<Utc>) -> f32 {
        ((target - Utc::now()).num_seconds() as f64 / 3_600.0) as f32
    }

    /// App showing day one with the countdown clock at `clock_offset_hours`.
    fn day_one(revealed: RevealedDays, clock_offset_hours: f32) -> App {
        let Ok(catalog) = DayCatalog::compiled(TOTAL_DAYS) else {
            panic!("compiled content must be valid");
        };
        let Ok(schedule) = UnlockSchedule::from_constants() else {
            panic!("constants describe a valid schedule");
        };

        let mut app = App::new();
        app.add_plugins((
            MinimalPlugins,
            StatesPlugin,
            AssetPlugin::default(),
            TickerPlugin,
            DayPagePlugin,
        ))
        .init_state::<Experience>()
        .add_sub_state::<Screen>()
        .add_computed_state::<OnDayPage>()
        .insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_millis(20)))
        .init_resource::<ButtonInput<KeyCode>>()
        .insert_resource(catalog)
        .insert_resource(schedule)
        .insert_resource(revealed)
        .insert_resource(CountdownConfig {
            clock_offset_hours,
            ..CountdownConfig::default()
        });
        app.update();

        app.world_mut().trigger(OpenDay { day: 1 });
        app.update();
        app.update();
        app
    }

    fn count<F: QueryFilter>(app: &mut App) -> usize {
        app.world_mut().query_filtered::<(), F>().iter(app.world()).count()
    }

    fn shown_items(app: &mut App) -> usize {
        app.world_mut()
            .query::<(&RevealItem, &Node)>()
            .iter(app.world())
            .filter(|(_, node)| node.display == Display::Flex)
            .count()
    }

    fn shows_text(app: &mut App, value: &str) -> bool {
        app.world_mut()
            .query::<&Text>()
            .iter(app.world())
            .any(|text| text.0 == value)
    }

    fn press_reveal(app: &mut App) {
        let Ok(button) = app
            .world_mut()
            .query_filtered::<Entity, With<RevealButton>>()
            .single(app.world())
        else {
            panic!("an unrevealed day shows one Reveal button");
        };
        let Some(mut interaction) = app.world_mut().get_mut::<Interaction>(button) else {
            panic!("buttons carry an interaction");
        };
        *interaction = Interaction::Pressed;
    }

    fn stored_days(store: &MemoryStore) -> Option<String> {
        let Ok(entries) = store.entries.lock() else {
            panic!("store lock is not poisoned");
        };
        entries.get(REVEALED_DAYS_KEY).cloned()
    }

    #[test]
    fn revealed_day_shows_every_item_without_a_reveal_button() {
        let store = MemoryStore::default();
        let mut revealed = RevealedDays::new(store.clone());
        revealed.mark_revealed(1);

        let mut app = day_one(revealed, offset_to(day_one_unlock() + TimeDelta::days(1)));

        assert_eq!(count::<With<RevealPanel>>(&mut app), 1);
        assert_eq!(count::<With<RevealButton>>(&mut app), 0);
        assert_eq!(count::<With<RevealItem>>(&mut app), DAY_ONE_ITEMS);
        assert_eq!(shown_items(&mut app), DAY_ONE_ITEMS);
    }

    #[test]
    fn pressing_reveal_persists_and_staggers_the_items() {
        let store = MemoryStore::default();
        let mut app = day_one(
            RevealedDays::new(store.clone()),
            offset_to(day_one_unlock() + TimeDelta::days(1)),
        );
        assert_eq!(count::<With<RevealButton>>(&mut app), 1);
        assert_eq!(shown_items(&mut app), 0);
        assert_eq!(stored_days(&store), None);

        press_reveal(&mut app);
        app.update();
        assert_eq!(stored_days(&store).as_deref(), Some("[1]"));
        assert_eq!(count::<With<RevealButton>>(&mut app), 0);

        // 20ms per update against a 50ms stagger
        app.update();
        assert_eq!(shown_items(&mut app), 1);
        for _ in 0..5 {
            app.update();
        }
        assert_eq!(shown_items(&mut app), 3);
        for _ in 0..6 {
            app.update();
        }
        assert_eq!(shown_items(&mut app), DAY_ONE_ITEMS);
    }

    #[test]
    fn locked_day_rebuilds_into_the_reveal_panel_once_unlocked() {
        let unlock = day_one_unlock();
        let mut app = day_one(
            RevealedDays::new(MemoryStore::default()),
            offset_to(unlock - TimeDelta::days(1)),
        );
        assert!(shows_text(&mut app, "Coming Soon"));
        assert_eq!(count::<With<RevealPanel>>(&mut app), 0);

        app.world_mut().resource_mut::<CountdownConfig>().clock_offset_hours =
            offset_to(unlock + TimeDelta::days(1));
        // the page refreshes once per second
        for _ in 0..60 {
            app.update();
        }

        assert!(!shows_text(&mut app, "Coming Soon"));
        assert_eq!(count::<With<RevealPanel>>(&mut app), 1);
        assert_eq!(count::<With<RevealButton>>(&mut app), 1);
        assert_eq!(count::<With<RevealItem>>(&mut app), DAY_ONE_ITEMS);
        assert_eq!(shown_items(&mut app), 0);
    }
}
