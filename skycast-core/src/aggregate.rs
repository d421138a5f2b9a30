//! Buckets forecast samples into per-day summaries.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::model::{DailySummary, WeatherSample};

/// Reduce `samples` to one [`DailySummary`] per UTC calendar day.
///
/// Days are emitted in the order they are first seen; the input is not
/// re-sorted, so out-of-order samples yield out-of-order days. Empty input
/// gives an empty result.
pub fn aggregate(samples: &[WeatherSample]) -> Vec<DailySummary> {
    let mut slots: HashMap<NaiveDate, usize> = HashMap::new();
    let mut days: Vec<DailySummary> = Vec::new();

    for sample in samples {
        let day = sample.timestamp.date_naive();

        match slots.get(&day) {
            Some(&idx) => {
                let slot = &mut days[idx];
                if sample.temperature < slot.temp_min {
                    slot.temp_min = sample.temperature;
                }
                if sample.temperature > slot.temp_max {
                    slot.temp_max = sample.temperature;
                }
                slot.humidity_repr = slot.humidity_repr.max(sample.humidity);
            }
            None => {
                slots.insert(day, days.len());
                days.push(DailySummary {
                    day,
                    temp_min: sample.temperature,
                    temp_max: sample.temperature,
                    humidity_repr: sample.humidity,
                });
            }
        }
    }

    log::debug!("aggregated {} samples into {} days", samples.len(), days.len());
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn two_days_min_max_and_humidity() {
        let samples = [
            WeatherSample::new(at(2024, 3, 1, 10), 5.0, 60),
            WeatherSample::new(at(2024, 3, 1, 13), 9.0, 70),
            WeatherSample::new(at(2024, 3, 2, 1), 2.0, 80),
        ];

        let days = aggregate(&samples);

        assert_eq!(
            days,
            vec![
                DailySummary {
                    day: date(2024, 3, 1),
                    temp_min: 5.0,
                    temp_max: 9.0,
                    humidity_repr: 70,
                },
                DailySummary {
                    day: date(2024, 3, 2),
                    temp_min: 2.0,
                    temp_max: 2.0,
                    humidity_repr: 80,
                },
            ]
        );
    }

    #[test]
    fn keeps_first_seen_order_for_unsorted_input() {
        let samples = [
            WeatherSample::new(at(2024, 3, 2, 6), 4.0, 50),
            WeatherSample::new(at(2024, 3, 1, 6), 7.0, 55),
            WeatherSample::new(at(2024, 3, 2, 18), -1.0, 90),
        ];

        let days = aggregate(&samples);

        let order: Vec<NaiveDate> = days.iter().map(|d| d.day).collect();
        assert_eq!(order, vec![date(2024, 3, 2), date(2024, 3, 1)]);

        // the revisited day is updated in place, not appended to the last slot
        assert_eq!(days[0].temp_min, -1.0);
        assert_eq!(days[0].temp_max, 4.0);
        assert_eq!(days[0].humidity_repr, 90);
        assert_eq!(days[1].temp_min, 7.0);
        assert_eq!(days[1].temp_max, 7.0);
    }

    #[test]
    fn identical_temperatures_collapse_to_single_row() {
        let samples: Vec<_> = (0..8)
            .map(|h| WeatherSample::new(at(2024, 7, 14, h * 3), 20.0, 40))
            .collect();

        let days = aggregate(&samples);

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].temp_min, 20.0);
        assert_eq!(days[0].temp_max, 20.0);
    }

    #[test]
    fn single_sample_day() {
        let days = aggregate(&[WeatherSample::new(at(2024, 1, 1, 0), -3.5, 33)]);

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].temp_min, days[0].temp_max);
        assert_eq!(days[0].humidity_repr, 33);
    }

    #[test]
    fn buckets_by_utc_date_boundary() {
        let late = Utc.with_ymd_and_hms(2024, 5, 10, 23, 59, 59).unwrap();
        let early = Utc.with_ymd_and_hms(2024, 5, 11, 0, 0, 0).unwrap();

        let days = aggregate(&[
            WeatherSample::new(late, 1.0, 10),
            WeatherSample::new(early, 2.0, 20),
        ]);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].day, date(2024, 5, 10));
        assert_eq!(days[1].day, date(2024, 5, 11));
    }

    #[test]
    fn five_day_forecast_properties() {
        // 40 three-hourly ticks starting mid-day, like a real 5-day forecast
        let start = at(2024, 9, 1, 12);
        let samples: Vec<_> = (0..40)
            .map(|i| {
                let ts = start + chrono::Duration::hours(3 * i);
                let temp = 10.0 + ((i * 7) % 11) as f64 - 5.0;
                let hum = (40 + (i * 13) % 60) as u8;
                WeatherSample::new(ts, temp, hum)
            })
            .collect();

        let days = aggregate(&samples);
        let again = aggregate(&samples);
        assert_eq!(days, again);

        let mut distinct: Vec<NaiveDate> = samples
            .iter()
            .map(|s| s.timestamp.date_naive())
            .collect();
        distinct.dedup();
        assert_eq!(days.len(), distinct.len());
        assert_eq!(days.iter().map(|d| d.day).collect::<Vec<_>>(), distinct);

        for summary in &days {
            let of_day: Vec<&WeatherSample> = samples
                .iter()
                .filter(|s| s.timestamp.date_naive() == summary.day)
                .collect();
            let temps = || of_day.iter().map(|s| s.temperature);
            let min = temps().fold(f64::INFINITY, f64::min);
            let max = temps().fold(f64::NEG_INFINITY, f64::max);
            let hum = of_day.iter().map(|s| s.humidity).max().unwrap();

            assert_eq!(summary.temp_min, min);
            assert_eq!(summary.temp_max, max);
            assert_eq!(summary.humidity_repr, hum);
            assert!(summary.temp_min <= summary.temp_max);
        }
    }

    #[test]
    fn input_is_left_untouched() {
        let samples = vec![
            WeatherSample::new(at(2024, 2, 2, 3), 8.0, 10),
            WeatherSample::new(at(2024, 2, 2, 6), 1.0, 99),
        ];
        let before = samples.clone();

        let days = aggregate(&samples);

        assert_eq!(days.len(), 1);
        assert_eq!(samples, before);
    }
}
