//! Venue markers
//!
//! One UI icon per located stop, re-projected from its geographic position every
//! frame. Markers on the far side of the globe or behind the camera are hidden.

use bevy::math::DVec3;
use bevy::prelude::*;

use super::constants::CHAMPAGNE;
use super::constants::MARKER_BORDER;
use super::constants::MARKER_COLOR;
use super::constants::MARKER_HOVER_SCALE;
use super::constants::MARKER_SIZE;
use super::constants::SELECTED_MARKER_SIZE;
use super::controller::GlobeCamera;
use super::geodesy::GeoPosition;
use super::geodesy::ReferenceSphere;
use super::geodesy::to_render;
use super::geodesy::up_at;
use super::scene::GlobeScene;
use super::selection::SelectStop;
use super::stops::SelectedStop;
use super::stops::TourStops;
use crate::schedule::GlobeSet;
use crate::state::Experience;

pub struct MarkersPlugin;

impl Plugin for MarkersPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Experience::Globe), spawn_markers)
            .add_systems(Update, press_marker.in_set(GlobeSet::Input))
            .add_systems(
                Update,
                (
                    style_selected_markers.run_if(resource_changed::<SelectedStop>),
                    project_markers,
                )
                    .chain()
                    .in_set(GlobeSet::Presentation),
            );
    }
}

#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct VenueMarker {
    pub stop_id:  String,
    pub selected: bool,
}

pub fn marker_size(selected: bool, hovered: bool) -> f32 {
    let base = if selected { SELECTED_MARKER_SIZE } else { MARKER_SIZE };
    if hovered { base * MARKER_HOVER_SCALE } else { base }
}

/// Whether `point` on the surface is on the hemisphere visible from `camera`.
pub fn faces_camera(camera: DVec3, point: DVec3) -> bool { (camera - point).dot(up_at(point)) > 0.0 }

fn marker_node(size: f32) -> Node {
    Node {
        position_type: PositionType::Absolute,
        width: Val::Px(size),
        height: Val::Px(size),
        border: UiRect::all(Val::Px(2.0)),
        ..default()
    }
}

fn spawn_markers(mut commands: Commands, stops: Res<TourStops>, selected: Res<SelectedStop>) {
    for (stop, position) in stops.located() {
        let is_selected = selected.is(&stop.id);
        commands.spawn((
            Name::new(format!("Marker {}", stop.city)),
            GlobeScene,
            VenueMarker {
                stop_id:  stop.id.clone(),
                selected: is_selected,
            },
            position,
            Button,
            marker_node(MARKER_SIZE),
            BackgroundColor(if is_selected { CHAMPAGNE } else { MARKER_COLOR }),
            BorderColor::all(MARKER_BORDER),
            Visibility::Hidden,
        ));
    }
    debug!("spawned {} venue markers", stops.located().count());
}

fn press_marker(
    mut commands: Commands,
    markers: Query<(&VenueMarker, &Interaction), Changed<Interaction>>,
) {
    for (marker, interaction) in &markers {
        if *interaction == Interaction::Pressed {
            commands.trigger(SelectStop {
                stop_id: marker.stop_id.clone(),
            });
        }
    }
}

fn style_selected_markers(
    selected: Res<SelectedStop>,
    mut markers: Query<(&mut VenueMarker, &mut BackgroundColor)>,
) {
    for (mut marker, mut background) in &mut markers {
        let is_selected = selected.is(&marker.stop_id);
        if marker.selected != is_selected {
            marker.selected = is_selected;
        }
        background.0 = if is_selected { CHAMPAGNE } else { MARKER_COLOR };
    }
}

fn project_markers(
    sphere: Res<ReferenceSphere>,
    cameras: Query<(&Camera, &GlobeCamera)>,
    mut markers: Query<(
        &VenueMarker,
        &GeoPosition,
        &Interaction,
        &mut Node,
        &mut Visibility,
    )>,
) {
    let Ok((camera, globe_camera)) = cameras.single() else {
        return;
    };
    let camera_transform = GlobalTransform::from(globe_camera.transform(&sphere));

    for (marker, position, interaction, mut node, mut visibility) in &mut markers {
        let point = sphere.surface_point(*position);
        let projected = faces_camera(globe_camera.position, point)
            .then(|| camera.world_to_viewport(&camera_transform, to_render(point)).ok())
            .flatten();
        let Some(screen) = projected else {
            visibility.set_if_neq(Visibility::Hidden);
            continue;
        };

        let size = marker_size(marker.selected, *interaction == Interaction::Hovered);
        node.left = Val::Px(size.mul_add(-0.5, screen.x));
        node.top = Val::Px(size.mul_add(-0.5, screen.y));
        node.width = Val::Px(size);
        node.height = Val::Px(size);
        visibility.set_if_neq(Visibility::Inherited);
    }
}
