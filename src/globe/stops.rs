use std::collections::HashSet;

use bevy::prelude::*;
use serde::Deserialize;

use super::error::GlobeError;
use super::geodesy::GeoPosition;

/// Tour stops compiled into the binary
const STOPS_RON: &str = include_str!("../../assets/data/stops.ron");

#[derive(Debug, Clone, PartialEq, Deserialize, Reflect)]
pub struct TourStop {
    pub id:    String,
    pub order: u32,
    pub city:  String,
    pub venue: String,
    #[serde(default)]
    pub date:  Option<String>,
    #[serde(default)]
    pub lat:   Option<f64>,
    #[serde(default)]
    pub lon:   Option<f64>,
}

impl TourStop {
    pub fn position(&self) -> Option<GeoPosition> {
        Some(GeoPosition::new(self.lat?, self.lon?))
    }

    pub fn coordinates_label(&self) -> Option<String> {
        self.position()
            .map(|position| format!("{:.4}, {:.4}", position.lat_deg, position.lon_deg))
    }
}

/// Stops sorted by `order`, ids unique.
#[derive(Resource, Reflect, Debug, Clone, Default, PartialEq)]
#[reflect(Resource)]
pub struct TourStops {
    stops: Vec<TourStop>,
}

impl TourStops {
    pub fn compiled() -> Result<Self, GlobeError> { Self::from_ron(STOPS_RON) }

    pub fn from_ron(source: &str) -> Result<Self, GlobeError> {
        let stops: Vec<TourStop> =
            ron::from_str(source).map_err(|e| GlobeError::StopData(e.to_string()))?;
        Self::new(stops)
    }

    pub fn new(mut stops: Vec<TourStop>) -> Result<Self, GlobeError> {
        let mut seen = HashSet::new();
        for stop in &stops {
            if !seen.insert(stop.id.as_str()) {
                return Err(GlobeError::StopData(format!("duplicate stop id {}", stop.id)));
            }
            if let Some(position) = stop.position()
                && (position.lat_deg.abs() > 90.0 || position.lon_deg.abs() > 180.0)
            {
                return Err(GlobeError::StopData(format!(
                    "stop {} has coordinates out of range",
                    stop.id
                )));
            }
        }
        stops.sort_by_key(|stop| stop.order);
        Ok(Self { stops })
    }

    pub fn iter(&self) -> impl Iterator<Item = &TourStop> { self.stops.iter() }

    pub fn get(&self, id: &str) -> Option<&TourStop> { self.stops.iter().find(|stop| stop.id == id) }

    /// Stops that can be placed on the globe, in tour order.
    pub fn located(&self) -> impl Iterator<Item = (&TourStop, GeoPosition)> {
        self.stops
            .iter()
            .filter_map(|stop| stop.position().map(|position| (stop, position)))
    }
}

/// Stop the camera is flying to or locked on
#[derive(Resource, Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectedStop(pub Option<String>);

impl SelectedStop {
    pub fn is(&self, id: &str) -> bool { self.0.as_deref() == Some(id) }
}
