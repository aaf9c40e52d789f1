//! Day unlock schedule
//!
//! Day `d` unlocks at `start + (d - 1)` calendar days, evaluated as a wall-clock
//! time in a named zone. Adding calendar days (not multiples of 24 hours) keeps the
//! unlock at the same local time across daylight-saving changes.

use bevy::prelude::Resource;
use chrono::DateTime;
use chrono::Days;
use chrono::NaiveDate;
use chrono::NaiveDateTime;
use chrono::NaiveTime;
use chrono::TimeDelta;
use chrono::TimeZone;
use chrono::Utc;
use chrono_tz::Tz;

use super::constants::START_DAY;
use super::constants::START_MONTH;
use super::constants::START_YEAR;
use super::constants::TIMEZONE;
use super::constants::TOTAL_DAYS;
use super::constants::UNLOCK_HOUR;
use super::constants::UNLOCK_MINUTE;
use super::error::CountdownError;

const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_MINUTE: i64 = 60;

/// Pure mapping from a 1-based day number to its unlock instant.
#[derive(Resource, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockSchedule {
    start_date:  NaiveDate,
    unlock_time: NaiveTime,
    total_days:  u32,
    zone:        Tz,
}

impl UnlockSchedule {
    /// Validates the schedule up front so a bad constant fails at startup, not per call.
    pub fn new(
        start_date: NaiveDate,
        unlock_time: NaiveTime,
        total_days: u32,
        zone: Tz,
    ) -> Result<Self, CountdownError> {
        if total_days == 0 {
            return Err(CountdownError::InvalidSchedule(
                "total day count must be at least 1".to_string(),
            ));
        }

        let schedule = Self {
            start_date,
            unlock_time,
            total_days,
            zone,
        };

        for day in 1..=total_days {
            schedule.unlock_instant(day)?;
        }

        Ok(schedule)
    }

    /// The schedule compiled into the app.
    pub fn from_constants() -> Result<Self, CountdownError> {
        let start_date =
            NaiveDate::from_ymd_opt(START_YEAR, START_MONTH, START_DAY).ok_or_else(|| {
                CountdownError::InvalidSchedule(format!(
                    "start date {START_YEAR}-{START_MONTH}-{START_DAY} does not exist"
                ))
            })?;
        let unlock_time = NaiveTime::from_hms_opt(UNLOCK_HOUR, UNLOCK_MINUTE, 0).ok_or_else(|| {
            CountdownError::InvalidSchedule(format!(
                "unlock time {UNLOCK_HOUR}:{UNLOCK_MINUTE} is not a valid time of day"
            ))
        })?;

        Self::new(start_date, unlock_time, TOTAL_DAYS, TIMEZONE)
    }

    pub const fn total_days(&self) -> u32 { self.total_days }

    pub const fn zone(&self) -> Tz { self.zone }

    const fn check_day(&self, day: u32) -> Result<(), CountdownError> {
        if day == 0 || day > self.total_days {
            return Err(CountdownError::InvalidDayIndex {
                day,
                total: self.total_days,
            });
        }
        Ok(())
    }

    /// Local calendar date on which `day` unlocks.
    pub fn unlock_date(&self, day: u32) -> Result<NaiveDate, CountdownError> {
        self.check_day(day)?;
        self.start_date
            .checked_add_days(Days::new(u64::from(day - 1)))
            .ok_or_else(|| {
                CountdownError::InvalidSchedule(format!("day {day} overflows the calendar"))
            })
    }

    pub fn unlock_instant(&self, day: u32) -> Result<DateTime<Tz>, CountdownError> {
        let date = self.unlock_date(day)?;
        resolve_wall_clock(self.zone, date.and_time(self.unlock_time)).ok_or_else(|| {
            CountdownError::InvalidSchedule(format!(
                "{} {} does not exist in {}",
                date,
                self.unlock_time,
                self.zone.name()
            ))
        })
    }

    /// Unlock instant of the last day; the hero countdown runs toward it.
    pub fn final_target(&self) -> Result<DateTime<Tz>, CountdownError> {
        self.unlock_instant(self.total_days)
    }

    /// Inclusive: the unlock instant itself counts as unlocked.
    pub fn is_unlocked(&self, day: u32, now: DateTime<Utc>) -> Result<bool, CountdownError> {
        Ok(now >= self.unlock_instant(day)?)
    }

    pub fn time_until_unlock(
        &self,
        day: u32,
        now: DateTime<Utc>,
    ) -> Result<TimeUntilUnlock, CountdownError> {
        let unlock = self.unlock_instant(day)?;
        Ok(TimeUntilUnlock::between(
            &now.with_timezone(&self.zone),
            &unlock,
        ))
    }

    /// e.g. `February 2, 2026 at 4:44 AM EST`
    pub fn format_unlock_instant(&self, day: u32) -> Result<String, CountdownError> {
        Ok(format_instant(&self.unlock_instant(day)?))
    }
}

pub fn format_instant(instant: &DateTime<Tz>) -> String {
    instant.format("%B %-d, %Y at %-I:%M %p %Z").to_string()
}

/// Maps a local wall-clock time to an instant. Ambiguous times (clocks falling back)
/// take the earlier instant; times inside a spring-forward gap move past the gap.
fn resolve_wall_clock(zone: Tz, local: NaiveDateTime) -> Option<DateTime<Tz>> {
    zone.from_local_datetime(&local).earliest().or_else(|| {
        local
            .checked_add_signed(TimeDelta::hours(1))
            .and_then(|shifted| zone.from_local_datetime(&shifted).earliest())
    })
}

/// Remaining time until an unlock, decomposed by cascading floors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeUntilUnlock {
    pub days:        u32,
    pub hours:       u32,
    pub minutes:     u32,
    pub seconds:     u32,
    pub is_unlocked: bool,
}

impl TimeUntilUnlock {
    pub const UNLOCKED: Self = Self {
        days:        0,
        hours:       0,
        minutes:     0,
        seconds:     0,
        is_unlocked: true,
    };

    /// Whole calendar days are consumed first (stepping the local date in `now`'s zone),
    /// then hours, minutes and seconds of the remainder, each floored.
    pub fn between(now: &DateTime<Tz>, target: &DateTime<Tz>) -> Self {
        if now >= target {
            return Self::UNLOCKED;
        }

        let zone = now.timezone();
        let local_now = now.naive_local();

        let mut days = 0_u32;
        let mut anchor = *now;
        while let Some(next) = local_now
            .checked_add_days(Days::new(u64::from(days) + 1))
            .and_then(|local| resolve_wall_clock(zone, local))
        {
            if next > *target {
                break;
            }
            days += 1;
            anchor = next;
        }

        let remaining = (*target - anchor).num_seconds().max(0);

        Self {
            days,
            hours: to_u32(remaining / SECONDS_PER_HOUR),
            minutes: to_u32((remaining % SECONDS_PER_HOUR) / SECONDS_PER_MINUTE),
            seconds: to_u32(remaining % SECONDS_PER_MINUTE),
            is_unlocked: false,
        }
    }

    /// Compact "3d 4h 12m" form; zero components are omitted.
    pub fn compact(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if self.days > 0 {
            parts.push(format!("{}d", self.days));
        }
        if self.hours > 0 {
            parts.push(format!("{}h", self.hours));
        }
        if self.minutes > 0 {
            parts.push(format!("{}m", self.minutes));
        }
        parts.join(" ")
    }
}

fn to_u32(value: i64) -> u32 { u32::try_from(value).unwrap_or(u32::MAX) }
