use bevy::prelude::*;
use serde::Deserialize;

use super::error::CountdownError;

/// Day content compiled into the binary
const DAYS_RON: &str = include_str!("../../assets/data/days.ron");

/// One entry of a day's content, tagged by kind.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub enum DayItem {
    Text {
        value: String,
    },
    Image {
        src: String,
        alt: String,
    },
    Audio {
        src:   String,
        label: String,
    },
    Song {
        title:  String,
        artist: String,
        #[serde(default)]
        link:   Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DayData {
    pub day_number: u32,
    pub title:      String,
    pub subtitle:   String,
    pub items:      Vec<DayItem>,
}

impl DayData {
    pub fn item_count_label(&self) -> String {
        match self.items.len() {
            1 => "1 item".to_string(),
            n => format!("{n} items"),
        }
    }
}

/// All days, ordered by day number and covering exactly `1..=total_days`.
#[derive(Resource, Debug, Clone)]
pub struct DayCatalog {
    days: Vec<DayData>,
}

impl DayCatalog {
    pub fn compiled(total_days: u32) -> Result<Self, CountdownError> {
        Self::from_ron(DAYS_RON, total_days)
    }

    pub fn from_ron(source: &str, total_days: u32) -> Result<Self, CountdownError> {
        let mut days: Vec<DayData> =
            ron::from_str(source).map_err(|e| CountdownError::Content(e.to_string()))?;
        days.sort_by_key(|day| day.day_number);

        for (expected, day) in (1..).zip(&days) {
            if day.day_number != expected {
                return Err(CountdownError::Content(format!(
                    "expected day {expected}, found day {}",
                    day.day_number
                )));
            }
        }

        let found = u32::try_from(days.len()).unwrap_or(u32::MAX);
        if found != total_days {
            return Err(CountdownError::Content(format!(
                "schedule has {total_days} days but content has {found}"
            )));
        }

        Ok(Self { days })
    }

    pub fn get(&self, day: u32) -> Option<&DayData> {
        self.days.iter().find(|data| data.day_number == day)
    }

    pub fn iter(&self) -> impl Iterator<Item = &DayData> { self.days.iter() }
}
