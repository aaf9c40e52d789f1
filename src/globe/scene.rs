//! Globe scene: textured reference sphere and the 3D camera looking at it.

use bevy::asset::LoadState;
use bevy::asset::RenderAssetUsages;
use bevy::math::DVec3;
use bevy::mesh::Indices;
use bevy::mesh::PrimitiveTopology;
use bevy::prelude::*;

use super::config::GlobeConfig;
use super::constants::CAMERA_FAR;
use super::constants::CAMERA_FOV_DEG;
use super::constants::CAMERA_NEAR;
use super::constants::FALLBACK_OCEAN;
use super::constants::GLOBE_LAT_SEGMENTS;
use super::constants::GLOBE_LON_SEGMENTS;
use super::constants::GLOBE_TEXTURE;
use super::constants::OVERVIEW_HOME_LAT_DEG;
use super::constants::OVERVIEW_HOME_LON_DEG;
use super::constants::RENDER_SCALE;
use super::constants::SPACE_COLOR;
use super::constraints::CameraMode;
use super::constraints::ConstraintManager;
use super::controller::GlobeCamera;
use super::controller::ScreenSpaceController;
use super::geodesy::GeoPosition;
use super::geodesy::ReferenceSphere;
use crate::schedule::GlobeSet;
use crate::state::Experience;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(Experience::Globe), spawn_globe_scene)
            .add_systems(
                Update,
                fall_back_when_imagery_fails
                    .run_if(resource_exists::<GlobeImagery>)
                    .in_set(GlobeSet::Presentation),
            );
    }
}

/// Everything spawned for the globe experience; despawned when it exits.
#[derive(Component, Default)]
pub struct GlobeScene;

#[derive(Component)]
pub struct GlobeSurface;

/// Imagery layer backing the globe material.
#[derive(Resource, Debug, Clone)]
pub struct GlobeImagery {
    pub image:          Handle<Image>,
    pub material:       Handle<StandardMaterial>,
    pub using_fallback: bool,
}

/// Camera pose the globe opens with and returns to from a venue.
pub fn overview_home(sphere: &ReferenceSphere, config: &GlobeConfig) -> GlobeCamera {
    let above = GeoPosition::new(OVERVIEW_HOME_LAT_DEG, OVERVIEW_HOME_LON_DEG).to_unit();
    GlobeCamera::new(
        above * (sphere.radius + config.overview_home_height),
        DVec3::ZERO,
    )
}

/// UV sphere whose texture coordinates follow an equirectangular image:
/// `u` runs west to east from -180°, `v` north to south.
#[allow(clippy::cast_precision_loss, reason = "segment counts are small")]
pub fn globe_mesh(radius: f32, lon_segments: u32, lat_segments: u32) -> Mesh {
    let lon_segments = lon_segments.max(3);
    let lat_segments = lat_segments.max(2);
    let row = lon_segments + 1;

    let mut positions = Vec::with_capacity((row * (lat_segments + 1)) as usize);
    let mut normals = Vec::with_capacity(positions.capacity());
    let mut uvs = Vec::with_capacity(positions.capacity());

    for j in 0..=lat_segments {
        let v = j as f32 / lat_segments as f32;
        let lat = 180.0f32.mul_add(-v, 90.0);
        for i in 0..=lon_segments {
            let u = i as f32 / lon_segments as f32;
            let lon = 360.0f32.mul_add(u, -180.0);
            let unit = GeoPosition::new(f64::from(lat), f64::from(lon))
                .to_unit()
                .as_vec3();
            positions.push((unit * radius).to_array());
            normals.push(unit.to_array());
            uvs.push([u, v]);
        }
    }

    let mut indices = Vec::with_capacity((lon_segments * lat_segments * 6) as usize);
    for j in 0..lat_segments {
        for i in 0..lon_segments {
            let north_west = j * row + i;
            let north_east = north_west + 1;
            let south_west = north_west + row;
            let south_east = south_west + 1;
            indices.extend_from_slice(&[south_west, south_east, north_east]);
            indices.extend_from_slice(&[south_west, north_east, north_west]);
        }
    }

    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::default())
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, normals)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs)
        .with_inserted_indices(Indices::U32(indices))
}

#[allow(clippy::cast_possible_truncation, reason = "render units fit in f32")]
fn spawn_globe_scene(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    config: Res<GlobeConfig>,
    sphere: Res<ReferenceSphere>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let image = asset_server.load(GLOBE_TEXTURE);
    let material = materials.add(StandardMaterial {
        base_color_texture: Some(image.clone()),
        unlit: true,
        ..default()
    });
    let radius = (sphere.radius * RENDER_SCALE) as f32;

    commands.spawn((
        Name::new("Globe"),
        GlobeScene,
        GlobeSurface,
        Mesh3d(meshes.add(globe_mesh(radius, GLOBE_LON_SEGMENTS, GLOBE_LAT_SEGMENTS))),
        MeshMaterial3d(material.clone()),
        Transform::IDENTITY,
    ));
    commands.insert_resource(GlobeImagery {
        image,
        material,
        using_fallback: false,
    });

    let camera = overview_home(&sphere, &config);
    let mut controller = ScreenSpaceController::default();
    let manager = ConstraintManager::new(CameraMode::Overview, &config, &mut controller);
    commands.spawn((
        Name::new("GlobeCamera"),
        GlobeScene,
        Camera3d::default(),
        Camera {
            clear_color: ClearColorConfig::Custom(SPACE_COLOR),
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: CAMERA_FOV_DEG.to_radians(),
            near: CAMERA_NEAR,
            far: CAMERA_FAR,
            ..default()
        }),
        camera.transform(&sphere),
        camera,
        controller,
        manager,
    ));
    info!("globe scene spawned");
}

fn fall_back_when_imagery_fails(
    asset_server: Res<AssetServer>,
    mut imagery: ResMut<GlobeImagery>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    if imagery.using_fallback {
        return;
    }
    if !matches!(
        asset_server.get_load_state(imagery.image.id()),
        Some(LoadState::Failed(_))
    ) {
        return;
    }
    if let Some(material) = materials.get_mut(&imagery.material) {
        material.base_color_texture = None;
        material.base_color = FALLBACK_OCEAN;
    }
    imagery.using_fallback = true;
    warn!("globe imagery {GLOBE_TEXTURE} failed to load, using fallback material");
}
