//! Stop list panel: tour order, camera mode and the selected stop's details.

use bevy::prelude::*;

use super::constants::CHAMPAGNE;
use super::constants::PANEL_BACKGROUND;
use super::constants::PANEL_HOVERED;
use super::constants::PANEL_MUTED;
use super::constants::PANEL_TEXT;
use super::constraints::ConstraintManager;
use super::controller::GlobeCamera;
use super::geodesy::GeoPosition;
use super::scene::GlobeScene;
use super::selection::ReturnToOverview;
use super::selection::SelectStop;
use super::stops::SelectedStop;
use super::stops::TourStop;
use super::stops::TourStops;
use crate::schedule::GlobeSet;
use crate::state::Experience;

const TITLE_FONT_SIZE: f32 = 20.0;
const ENTRY_FONT_SIZE: f32 = 15.0;
const DETAIL_FONT_SIZE: f32 = 13.0;

pub struct PanelPlugin;

impl Plugin for PanelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Experience::Globe), spawn_panel)
            .add_systems(Update, press_panel_buttons.in_set(GlobeSet::Input))
            .add_systems(
                Update,
                (
                    update_mode_label,
                    update_selection_detail.run_if(resource_changed::<SelectedStop>),
                )
                    .in_set(GlobeSet::Presentation),
            );
    }
}

#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct StopButton {
    pub stop_id: String,
}

#[derive(Component)]
pub struct OverviewButton;

#[derive(Component)]
struct ModeLabel;

#[derive(Component)]
struct SelectionDetail;

fn text(value: impl Into<String>, font_size: f32, color: Color) -> impl Bundle {
    (
        Text::new(value),
        TextFont {
            font_size,
            ..default()
        },
        TextColor(color),
    )
}

fn entry_node() -> Node {
    Node {
        flex_direction: FlexDirection::Column,
        padding: UiRect::axes(Val::Px(10.0), Val::Px(6.0)),
        ..default()
    }
}

/// Text of a stop entry: "N. City" and its venue.
pub fn stop_entry_lines(stop: &TourStop) -> (String, String) {
    let venue = match &stop.date {
        Some(date) => format!("{} · {date}", stop.venue),
        None => stop.venue.clone(),
    };
    (format!("{}. {}", stop.order, stop.city), venue)
}

/// Detail line shown for the selected stop.
pub fn selection_detail(stops: &TourStops, selected: &SelectedStop) -> String {
    let Some(stop) = selected.0.as_deref().and_then(|id| stops.get(id)) else {
        return "Select a stop".to_string();
    };
    match stop.coordinates_label() {
        Some(coordinates) => format!("{}, {} ({coordinates})", stop.city, stop.venue),
        None => format!("{}, {}", stop.city, stop.venue),
    }
}

fn spawn_panel(mut commands: Commands, stops: Res<TourStops>, selected: Res<SelectedStop>) {
    commands
        .spawn((
            Name::new("StopPanel"),
            GlobeScene,
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(16.0),
                top: Val::Px(16.0),
                width: Val::Px(300.0),
                max_height: Val::Percent(90.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(4.0),
                padding: UiRect::all(Val::Px(12.0)),
                overflow: Overflow::clip_y(),
                ..default()
            },
            BackgroundColor(PANEL_BACKGROUND),
        ))
        .with_children(|panel| {
            panel.spawn(text("Tour", TITLE_FONT_SIZE, CHAMPAGNE));
            panel.spawn((ModeLabel, text("", DETAIL_FONT_SIZE, PANEL_MUTED)));
            panel.spawn((
                SelectionDetail,
                text(selection_detail(&stops, &selected), DETAIL_FONT_SIZE, PANEL_TEXT),
            ));

            panel
                .spawn((OverviewButton, Button, entry_node(), BackgroundColor(Color::NONE)))
                .with_child(text("Overview", ENTRY_FONT_SIZE, CHAMPAGNE));

            for stop in stops.iter() {
                let (heading, venue) = stop_entry_lines(stop);
                let heading_color = if stop.position().is_some() { PANEL_TEXT } else { PANEL_MUTED };
                panel
                    .spawn((
                        StopButton {
                            stop_id: stop.id.clone(),
                        },
                        Button,
                        entry_node(),
                        BackgroundColor(Color::NONE),
                    ))
                    .with_children(|entry| {
                        entry.spawn(text(heading, ENTRY_FONT_SIZE, heading_color));
                        entry.spawn(text(venue, DETAIL_FONT_SIZE, PANEL_MUTED));
                    });
            }
        });
}

fn press_panel_buttons(
    mut commands: Commands,
    mut buttons: Query<
        (
            &Interaction,
            &mut BackgroundColor,
            Option<&StopButton>,
            Has<OverviewButton>,
        ),
        (Changed<Interaction>, Or<(With<StopButton>, With<OverviewButton>)>),
    >,
) {
    for (interaction, mut background, stop, overview) in &mut buttons {
        match interaction {
            Interaction::Pressed => {
                if let Some(stop) = stop {
                    commands.trigger(SelectStop {
                        stop_id: stop.stop_id.clone(),
                    });
                } else if overview {
                    commands.trigger(ReturnToOverview);
                }
            },
            Interaction::Hovered => background.0 = PANEL_HOVERED,
            Interaction::None => background.0 = Color::NONE,
        }
    }
}

fn update_mode_label(
    cameras: Query<
        (&ConstraintManager, &GlobeCamera),
        Or<(Changed<ConstraintManager>, Changed<GlobeCamera>)>,
    >,
    mut labels: Query<&mut Text, With<ModeLabel>>,
) {
    let Some((manager, camera)) = cameras.iter().next() else {
        return;
    };
    let value = mode_line(manager, camera);
    for mut label in &mut labels {
        if label.0 != value {
            label.0.clone_from(&value);
        }
    }
}

/// Camera mode, lock state and the point below the camera.
pub fn mode_line(manager: &ConstraintManager, camera: &GlobeCamera) -> String {
    let below = GeoPosition::from_point(camera.position);
    let lock = if manager.is_locked() { " (locked)" } else { "" };
    format!(
        "Camera: {}{lock} over {:.2}, {:.2}",
        manager.mode().label(),
        below.lat_deg,
        below.lon_deg
    )
}

fn update_selection_detail(
    stops: Res<TourStops>,
    selected: Res<SelectedStop>,
    mut details: Query<&mut Text, With<SelectionDetail>>,
) {
    for mut detail in &mut details {
        detail.0 = selection_detail(&stops, &selected);
    }
}
