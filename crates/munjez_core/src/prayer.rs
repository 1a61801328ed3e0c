use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::calendar::WEEK_LENGTH;
use crate::display;
use crate::error::{CalendarError, Result};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    pub const ORDER: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    pub fn arabic_name(self) -> &'static str {
        match self {
            Prayer::Fajr => "الفجر",
            Prayer::Dhuhr => "الظهر",
            Prayer::Asr => "العصر",
            Prayer::Maghrib => "المغرب",
            Prayer::Isha => "العشاء",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyPrayerTimes {
    pub fajr: NaiveTime,
    pub dhuhr: NaiveTime,
    pub asr: NaiveTime,
    pub maghrib: NaiveTime,
    pub isha: NaiveTime,
}

impl DailyPrayerTimes {
    pub fn parse(fajr: &str, dhuhr: &str, asr: &str, maghrib: &str, isha: &str) -> Result<Self> {
        Ok(Self {
            fajr: parse_clock(fajr)?,
            dhuhr: parse_clock(dhuhr)?,
            asr: parse_clock(asr)?,
            maghrib: parse_clock(maghrib)?,
            isha: parse_clock(isha)?,
        })
    }

    pub fn time_of(&self, prayer: Prayer) -> NaiveTime {
        match prayer {
            Prayer::Fajr => self.fajr,
            Prayer::Dhuhr => self.dhuhr,
            Prayer::Asr => self.asr,
            Prayer::Maghrib => self.maghrib,
            Prayer::Isha => self.isha,
        }
    }
}

impl Default for DailyPrayerTimes {
    fn default() -> Self {
        let hm = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap_or(NaiveTime::MIN);
        Self {
            fajr: hm(4, 15),
            dhuhr: hm(12, 5),
            asr: hm(15, 30),
            maghrib: hm(18, 45),
            isha: hm(20, 15),
        }
    }
}

fn parse_clock(value: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M").map_err(|_| CalendarError::invalid(value))
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UpcomingPrayer {
    pub prayer: Prayer,
    pub at: NaiveDateTime,
    #[serde(skip)]
    pub remaining: Duration,
}

impl UpcomingPrayer {
    pub fn remaining_label(&self) -> String {
        let minutes = self.remaining.num_minutes().max(0);
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PrayerDay {
    pub date: NaiveDate,
    pub day_name: &'static str,
    pub times: DailyPrayerTimes,
}

/// Fixed per-day table with a single fallback row for dates it does not cover.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrayerSchedule {
    days: BTreeMap<NaiveDate, DailyPrayerTimes>,
    fallback: DailyPrayerTimes,
}

impl PrayerSchedule {
    pub fn new(fallback: DailyPrayerTimes) -> Self {
        Self {
            days: BTreeMap::new(),
            fallback,
        }
    }

    pub fn with_day(mut self, date: NaiveDate, times: DailyPrayerTimes) -> Self {
        self.days.insert(date, times);
        self
    }

    pub fn times_for(&self, date: NaiveDate) -> DailyPrayerTimes {
        self.days.get(&date).copied().unwrap_or(self.fallback)
    }

    /// Seven consecutive days beginning at `start`, each resolved like `times_for`.
    pub fn week_from(&self, start: NaiveDate) -> Result<Vec<PrayerDay>> {
        (0..WEEK_LENGTH as i64)
            .map(|offset| {
                let date = start
                    .checked_add_signed(Duration::days(offset))
                    .ok_or(CalendarError::OutOfRange {
                        date: start,
                        offset_days: offset,
                    })?;
                Ok(PrayerDay {
                    date,
                    day_name: display::weekday_name(date.weekday()),
                    times: self.times_for(date),
                })
            })
            .collect()
    }

    /// First prayer strictly after `now` on the same day, otherwise the next day's fajr.
    pub fn next_prayer(&self, now: NaiveDateTime) -> Result<UpcomingPrayer> {
        let today = now.date();
        let times = self.times_for(today);
        let upcoming = Prayer::ORDER
            .into_iter()
            .map(|prayer| (prayer, today.and_time(times.time_of(prayer))))
            .find(|(_, at)| *at > now);

        let (prayer, at) = match upcoming {
            Some(found) => found,
            None => {
                let tomorrow = today
                    .succ_opt()
                    .ok_or(CalendarError::OutOfRange {
                        date: today,
                        offset_days: 1,
                    })?;
                (
                    Prayer::Fajr,
                    tomorrow.and_time(self.times_for(tomorrow).fajr),
                )
            }
        };

        Ok(UpcomingPrayer {
            prayer,
            at,
            remaining: at - now,
        })
    }
}

/// Three days of Riyadh times shipped with the demo data.
pub fn riyadh_schedule() -> Result<PrayerSchedule> {
    let day = |y, m, d| {
        NaiveDate::from_ymd_opt(y, m, d)
            .ok_or_else(|| CalendarError::invalid(format!("{}-{}-{}", y, m, d)))
    };
    Ok(PrayerSchedule::new(DailyPrayerTimes::default())
        .with_day(
            day(2025, 8, 25)?,
            DailyPrayerTimes::parse("04:15", "12:05", "15:30", "18:45", "20:15")?,
        )
        .with_day(
            day(2025, 8, 26)?,
            DailyPrayerTimes::parse("04:16", "12:05", "15:29", "18:44", "20:14")?,
        )
        .with_day(
            day(2025, 8, 27)?,
            DailyPrayerTimes::parse("04:17", "12:04", "15:29", "18:43", "20:13")?,
        ))
}
