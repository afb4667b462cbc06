use crate::errors::ActivityError;
use crate::models::{ActivityHeatmap, ActivityRecord, DayBucket, MonthSpan, Selection, WeekRow};
use crate::seasons;
use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, TimeZone};
use tracing::debug;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const MAX_LEVEL: u8 = 4;

/// Longest range a single heatmap may cover, in days.
pub const MAX_RANGE_DAYS: i64 = 3 * 366;

pub fn aggregate(records: &[ActivityRecord], selection: Selection) -> Result<ActivityHeatmap, ActivityError> {
    aggregate_at(records, selection, &Local::now())
}

/// Resolves `selection` against `now` and buckets records by calendar day in
/// `now`'s time zone.
pub fn aggregate_at<Tz: TimeZone>(
    records: &[ActivityRecord],
    selection: Selection,
    now: &DateTime<Tz>,
) -> Result<ActivityHeatmap, ActivityError> {
    let (range_start, range_end) = resolve_range(selection, now.date_naive())?;
    aggregate_range(records, range_start, range_end, &now.timezone())
}

pub fn resolve_range(selection: Selection, today: NaiveDate) -> Result<(NaiveDate, NaiveDate), ActivityError> {
    match selection {
        Selection::RollingYear => {
            let start = today
                .checked_sub_signed(Duration::days(365))
                .ok_or(ActivityError::InvalidYear(today.year()))?;
            Ok((start, today))
        }
        Selection::Year { year } => {
            let start = NaiveDate::from_ymd_opt(year, 1, 1).ok_or(ActivityError::InvalidYear(year))?;
            let end = NaiveDate::from_ymd_opt(year, 12, 31).ok_or(ActivityError::InvalidYear(year))?;
            Ok((start, end))
        }
        Selection::Season { id } => {
            let season = seasons::season_by_id(id).ok_or(ActivityError::UnknownSeason(id))?;
            Ok((season.start_date, season.end_date.unwrap_or(today)))
        }
        Selection::Custom { start, end } => Ok((start, end)),
    }
}

/// Builds the heatmap for the closed interval `[range_start, range_end]`.
/// Records whose local day falls outside the interval are dropped.
pub fn aggregate_range<Tz: TimeZone>(
    records: &[ActivityRecord],
    range_start: NaiveDate,
    range_end: NaiveDate,
    tz: &Tz,
) -> Result<ActivityHeatmap, ActivityError> {
    if range_start > range_end {
        return Err(ActivityError::InvalidRange {
            start: range_start,
            end: range_end,
        });
    }
    let days = (range_end - range_start).num_days() + 1;
    if days > MAX_RANGE_DAYS {
        return Err(ActivityError::RangeTooLong {
            days,
            max: MAX_RANGE_DAYS,
        });
    }

    let mut buckets: Vec<DayBucket> = range_start
        .iter_days()
        .take_while(|date| *date <= range_end)
        .map(DayBucket::empty)
        .collect();

    let mut dropped = 0usize;
    for record in records {
        let Some(date) = local_day(record.timestamp, tz) else {
            dropped += 1;
            continue;
        };
        if date < range_start || date > range_end {
            dropped += 1;
            continue;
        }

        let index = (date - range_start).num_days() as usize;
        let bucket = &mut buckets[index];
        bucket.records.push(*record);
        bucket.won = bucket.won.saturating_add(u64::from(record.won));
        bucket.lost = bucket.lost.saturating_add(u64::from(record.lost));
        bucket.game_count = bucket.game_count.saturating_add(record.games());
    }

    let max_intensity = buckets
        .iter()
        .map(|bucket| bucket.game_count)
        .max()
        .unwrap_or(0)
        .max(1);
    for bucket in &mut buckets {
        bucket.level = intensity_level(bucket.game_count, max_intensity);
    }

    // Both boundary days are left out of the headline total.
    let total_games = buckets
        .iter()
        .filter(|bucket| bucket.date > range_start && bucket.date < range_end)
        .map(|bucket| bucket.game_count)
        .sum();

    let weeks = into_weeks(buckets);
    let month_spans = month_spans(range_start, range_end, &weeks);

    debug!(
        %range_start,
        %range_end,
        records = records.len(),
        dropped,
        weeks = weeks.len(),
        total_games,
        "aggregated activity"
    );

    Ok(ActivityHeatmap {
        range_start,
        range_end,
        weeks,
        total_games,
        max_intensity,
        month_spans,
    })
}

/// Shade 0..=4 for a day. Any activity at all is at least 1.
pub fn intensity_level(game_count: u64, max_intensity: u64) -> u8 {
    if game_count == 0 {
        return 0;
    }
    let scaled = (game_count as f64 / max_intensity.max(1) as f64 * f64::from(MAX_LEVEL)).round();
    (scaled.clamp(0.0, f64::from(MAX_LEVEL)) as u8).max(1)
}

fn local_day<Tz: TimeZone>(timestamp: i64, tz: &Tz) -> Option<NaiveDate> {
    tz.timestamp_millis_opt(timestamp)
        .single()
        .map(|moment| moment.date_naive())
}

fn into_weeks(buckets: Vec<DayBucket>) -> Vec<WeekRow> {
    let mut weeks = Vec::with_capacity(buckets.len() / 7 + 2);
    let mut current = WeekRow::empty();
    let mut filled = false;

    for bucket in buckets {
        let slot = bucket.date.weekday().num_days_from_monday() as usize;
        if slot == 0 && filled {
            weeks.push(std::mem::replace(&mut current, WeekRow::empty()));
        }
        current.days[slot] = Some(bucket);
        filled = true;
    }
    if filled {
        weeks.push(current);
    }

    weeks
}

fn month_spans(range_start: NaiveDate, range_end: NaiveDate, weeks: &[WeekRow]) -> Vec<MonthSpan> {
    let first = month_index(range_start);
    let last = month_index(range_end);

    let mut spans: Vec<MonthSpan> = (first..=last)
        .map(|index| {
            let month = index.rem_euclid(12) as u32;
            MonthSpan {
                year: index.div_euclid(12) as i32,
                month,
                label: MONTH_LABELS[month as usize].to_string(),
                week_count: 0,
            }
        })
        .collect();

    for week in weeks {
        if let Some(day) = week.first_day() {
            let offset = (month_index(day.date) - first) as usize;
            if let Some(span) = spans.get_mut(offset) {
                span.week_count += 1;
            }
        }
    }

    spans
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}
