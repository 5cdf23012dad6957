use std::collections::BTreeMap;

use chrono::{Local, NaiveDate, TimeZone};
use normalizer::ActivityEvent;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivityBucket {
    pub date: NaiveDate,
    pub count: u32,
}

impl ActivityBucket {
    /// Short numeric label, e.g. `2024/1/5`.
    pub fn label(&self) -> String {
        self.date.format("%Y/%-m/%-d").to_string()
    }
}

/// Events per calendar day, ascending, limited to the most recent days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ActivityHistogram {
    buckets: Vec<ActivityBucket>,
}

impl ActivityHistogram {
    /// Groups by the viewer's local calendar date.
    pub fn from_events(events: &[ActivityEvent], max_days: usize) -> Self {
        Self::from_events_in(events, &Local, max_days)
    }

    /// Groups by calendar date in `tz`. When more than `max_days` distinct
    /// days are present the earliest ones are dropped.
    pub fn from_events_in<Tz: TimeZone>(events: &[ActivityEvent], tz: &Tz, max_days: usize) -> Self {
        let mut per_day: BTreeMap<NaiveDate, u32> = BTreeMap::new();
        for event in events {
            let day = event.created_at.with_timezone(tz).date_naive();
            *per_day.entry(day).or_insert(0) += 1;
        }
        let skip = per_day.len().saturating_sub(max_days);
        let buckets = per_day
            .into_iter()
            .skip(skip)
            .map(|(date, count)| ActivityBucket { date, count })
            .collect();
        Self { buckets }
    }

    pub fn buckets(&self) -> &[ActivityBucket] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn total(&self) -> u32 {
        self.buckets.iter().map(|b| b.count).sum()
    }

    pub fn peak(&self) -> Option<ActivityBucket> {
        self.buckets.iter().copied().max_by_key(|b| b.count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, FixedOffset, Utc};

    fn at(rfc3339: &str) -> ActivityEvent {
        ActivityEvent {
            created_at: rfc3339.parse().unwrap(),
        }
    }

    #[test]
    fn groups_by_local_day_not_utc() {
        let tokyo = FixedOffset::east_opt(9 * 3600).unwrap();
        // 15:30Z and 23:50Z on Jan 1 are Jan 2 00:30 and 08:50 in Tokyo.
        let events = [
            at("2024-01-01T15:30:00Z"),
            at("2024-01-01T23:50:00Z"),
            at("2024-01-01T10:00:00Z"),
        ];
        let histogram = ActivityHistogram::from_events_in(&events, &tokyo, 30);
        let days: Vec<_> = histogram.buckets().iter().map(|b| (b.label(), b.count)).collect();
        assert_eq!(
            days,
            vec![("2024/1/1".to_string(), 1), ("2024/1/2".to_string(), 2)]
        );

        let in_utc = ActivityHistogram::from_events_in(&events, &Utc, 30);
        assert_eq!(in_utc.len(), 1);
        assert_eq!(in_utc.total(), 3);
    }

    #[test]
    fn keeps_only_most_recent_days_in_ascending_order() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let events: Vec<_> = (0..45)
            .rev()
            .map(|day| ActivityEvent {
                created_at: start + Duration::days(day),
            })
            .collect();
        let histogram = ActivityHistogram::from_events_in(&events, &Utc, 30);
        assert_eq!(histogram.len(), 30);
        assert!(histogram
            .buckets()
            .windows(2)
            .all(|w| w[0].date < w[1].date));
        assert_eq!(histogram.buckets()[0].date, NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
        assert_eq!(histogram.total(), 30);
    }

    #[test]
    fn peak_reports_busiest_day() {
        let events = [
            at("2024-05-01T01:00:00Z"),
            at("2024-05-02T01:00:00Z"),
            at("2024-05-02T02:00:00Z"),
        ];
        let histogram = ActivityHistogram::from_events_in(&events, &Utc, 30);
        let peak = histogram.peak().unwrap();
        assert_eq!(peak.label(), "2024/5/2");
        assert_eq!(peak.count, 2);
    }

    #[test]
    fn no_events_no_buckets() {
        let histogram = ActivityHistogram::from_events(&[], 30);
        assert!(histogram.is_empty());
        assert_eq!(histogram.peak(), None);
    }
}
