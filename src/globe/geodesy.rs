//! Geographic positions on the reference sphere
//!
//! Globe frame: origin at the center, +Y through the north pole, +X through
//! (0°, 0°) and -Z through (0°, 90°E), so east reads left-to-right when viewed
//! from outside with north up.

use bevy::math::DQuat;
use bevy::math::DVec3;
use bevy::prelude::*;

use super::constants::RENDER_SCALE;
use super::constants::WGS84_A;

/// Sphere every height and surface correction is measured against
#[derive(Resource, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Resource)]
pub struct ReferenceSphere {
    pub radius: f64,
}

impl Default for ReferenceSphere {
    fn default() -> Self { Self { radius: WGS84_A } }
}

impl ReferenceSphere {
    pub fn height_of(&self, point: DVec3) -> f64 { point.length() - self.radius }

    /// Point `height` meters above the surface in the direction of `point`.
    pub fn lift(&self, point: DVec3, height: f64) -> DVec3 {
        up_at(point) * (self.radius + height)
    }

    pub fn surface_point(&self, position: GeoPosition) -> DVec3 {
        position.to_unit() * self.radius
    }
}

#[derive(Component, Reflect, Debug, Clone, Copy, PartialEq)]
#[reflect(Component)]
pub struct GeoPosition {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl GeoPosition {
    pub const fn new(lat_deg: f64, lon_deg: f64) -> Self { Self { lat_deg, lon_deg } }

    pub fn to_unit(self) -> DVec3 {
        let (lat, lon) = (self.lat_deg.to_radians(), self.lon_deg.to_radians());
        DVec3::new(lat.cos() * lon.cos(), lat.sin(), -lat.cos() * lon.sin())
    }

    pub fn from_point(point: DVec3) -> Self {
        let unit = up_at(point);
        Self {
            lat_deg: unit.y.clamp(-1.0, 1.0).asin().to_degrees(),
            lon_deg: (-unit.z).atan2(unit.x).to_degrees(),
        }
    }
}

/// Outward surface normal below `point`; north for the center itself.
pub fn up_at(point: DVec3) -> DVec3 { point.try_normalize().unwrap_or(DVec3::Y) }

/// Local east and north tangents at `point`. Falls back to +X east at the poles.
pub fn tangent_frame(point: DVec3) -> (DVec3, DVec3) {
    let up = up_at(point);
    let east = DVec3::Y.cross(up).try_normalize().unwrap_or(DVec3::NEG_Z);
    let north = up.cross(east);
    (east, north)
}

/// `samples + 1` points along the great circle from `from` to `to`, at `altitude`.
pub fn great_circle_points(
    sphere: &ReferenceSphere,
    from: GeoPosition,
    to: GeoPosition,
    altitude: f64,
    samples: usize,
) -> Vec<DVec3> {
    let (a, b) = (from.to_unit(), to.to_unit());
    let arc = DQuat::from_rotation_arc(a, b);
    let samples = samples.max(1);
    (0..=samples)
        .map(|i| {
            #[allow(clippy::cast_precision_loss, reason = "sample counts are small")]
            let t = i as f64 / samples as f64;
            DQuat::IDENTITY.slerp(arc, t) * a * (sphere.radius + altitude)
        })
        .collect()
}

/// Globe-frame meters to render units.
pub fn to_render(point: DVec3) -> Vec3 { (point * RENDER_SCALE).as_vec3() }

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn close(a: DVec3, b: DVec3) -> bool { (a - b).length() < EPSILON }

    #[test]
    fn cardinal_points_map_to_axes() {
        assert!(close(GeoPosition::new(0.0, 0.0).to_unit(), DVec3::X));
        assert!(close(GeoPosition::new(90.0, 0.0).to_unit(), DVec3::Y));
        assert!(close(GeoPosition::new(0.0, 90.0).to_unit(), DVec3::NEG_Z));
    }

    #[test]
    fn point_round_trips_through_coordinates() {
        let toronto = GeoPosition::new(43.6435, -79.3791);
        let back = GeoPosition::from_point(toronto.to_unit() * 42.0);
        assert!((back.lat_deg - toronto.lat_deg).abs() < 1e-9);
        assert!((back.lon_deg - toronto.lon_deg).abs() < 1e-9);
    }

    #[test]
    fn heights_are_measured_from_the_sphere() {
        let sphere = ReferenceSphere::default();
        let lifted = sphere.lift(DVec3::new(0.0, 3.0, 4.0), 250.0);
        assert!((sphere.height_of(lifted) - 250.0).abs() < 1e-6);
        assert!(close(up_at(lifted), DVec3::new(0.0, 0.6, 0.8)));
    }

    #[test]
    fn tangent_frame_points_east_and_north() {
        let (east, north) = tangent_frame(DVec3::X);
        assert!(close(east, DVec3::NEG_Z));
        assert!(close(north, DVec3::Y));
    }

    #[test]
    fn great_circle_stays_at_altitude_and_hits_both_ends() {
        let sphere = ReferenceSphere::default();
        let from = GeoPosition::new(43.6, -79.4);
        let to = GeoPosition::new(49.3, -123.1);
        let points = great_circle_points(&sphere, from, to, 1_000.0, 16);

        assert_eq!(points.len(), 17);
        assert!(points
            .iter()
            .all(|p| (sphere.height_of(*p) - 1_000.0).abs() < 1e-3));
        let end = to.to_unit() * (sphere.radius + 1_000.0);
        assert!((points[16] - end).length() < 1e-3);
    }
}
