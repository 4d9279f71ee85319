#[cfg(test)]
mod tests {
    use crate::refund::compute_refund;
    use crate::slots::{
        classify_slots, generate_candidate_slots, parse_time_of_day, SlotQuery,
        INSUFFICIENT_TIME_REASON,
    };
    use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
    use mindmend_common::{AvailabilityWindow, UnavailabilityRecord};
    use proptest::prelude::*;

    fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, 5).unwrap()
    }

    fn hhmm(minute: i64) -> String {
        format!("{:02}:{:02}", minute / 60, minute % 60)
    }

    fn minutes(value: &str) -> i64 {
        let time = parse_time_of_day(value).expect("slot times are HH:MM");
        i64::from(chrono::Timelike::hour(&time)) * 60 + i64::from(chrono::Timelike::minute(&time))
    }

    // Blocks as (start minute, length) pairs on the test day
    fn to_records(blocks: &[(i64, i64)]) -> Vec<UnavailabilityRecord> {
        let day_start = Utc.with_ymd_and_hms(2025, 5, 5, 0, 0, 0).unwrap();
        blocks
            .iter()
            .map(|&(start, length)| UnavailabilityRecord {
                id: None,
                therapist_id: "t-1".to_string(),
                start_time: (day_start + Duration::minutes(start)).to_rfc3339(),
                end_time: (day_start + Duration::minutes(start + length)).to_rfc3339(),
                reason: None,
                appointment_id: None,
            })
            .collect()
    }

    proptest! {
        // Every candidate lands in exactly one list
        #[test]
        fn test_candidates_partitioned(
            window_start in 0..(12 * 60i64),
            window_length in 30..(11 * 60i64),
            interval in prop::sample::select(vec![15i64, 30, 45, 60]),
            session in prop::sample::select(vec![30i64, 60, 90, 120]),
            blocks in prop::collection::vec((0..(24 * 60i64), 1..240i64), 0..6),
        ) {
            let window = AvailabilityWindow {
                therapist_id: "t-1".to_string(),
                day_of_week: Weekday::Mon,
                start_time: hhmm(window_start),
                end_time: hhmm((window_start + window_length).min(23 * 60 + 59)),
            };
            let records = to_records(&blocks);
            let query = SlotQuery::new("t-1", monday(), session).with_interval(interval);

            let candidates = generate_candidate_slots(&window, interval);
            let result = classify_slots(&window, &records, &query).unwrap();

            prop_assert_eq!(result.available.len() + result.unavailable.len(), candidates.len());
        }

        // An available slot leaves room for the full session, clear of every block
        #[test]
        fn test_available_slots_fit_session(
            session in prop::sample::select(vec![30i64, 60, 90, 120]),
            blocks in prop::collection::vec((8 * 60..(18 * 60i64), 15..180i64), 0..5),
        ) {
            let window = AvailabilityWindow {
                therapist_id: "t-1".to_string(),
                day_of_week: Weekday::Mon,
                start_time: "09:00".to_string(),
                end_time: "17:00".to_string(),
            };
            let records = to_records(&blocks);
            let query = SlotQuery::new("t-1", monday(), session);
            let result = classify_slots(&window, &records, &query).unwrap();

            for slot in &result.available {
                let start = minutes(&slot.start_time);
                let end = start + session;
                prop_assert!(end <= 17 * 60);
                for &(block_start, length) in &blocks {
                    let block_end = block_start + length;
                    prop_assert!(
                        end <= block_start || start >= block_end,
                        "slot {} overlaps block {}-{}", slot.start_time, hhmm(block_start), hhmm(block_end)
                    );
                }
            }

            // Longer sessions never free up more slots
            if session > 30 {
                let shorter = classify_slots(&window, &records, &SlotQuery::new("t-1", monday(), 30)).unwrap();
                prop_assert!(result.available.len() <= shorter.available.len());
                let insufficient = result
                    .unavailable
                    .iter()
                    .filter(|slot| slot.reason == INSUFFICIENT_TIME_REASON)
                    .count();
                prop_assert_eq!(shorter.available.len(), result.available.len() + insufficient);
            }
        }

        // Less notice never means a larger refund
        #[test]
        fn test_refund_monotonic(
            notice_a in -72..200i64,
            notice_b in -72..200i64,
            amount in 0..1_000_000i64,
        ) {
            let now = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
            let (more, less) = if notice_a >= notice_b { (notice_a, notice_b) } else { (notice_b, notice_a) };
            let generous = compute_refund(now + Duration::hours(more), now, amount).unwrap();
            let strict = compute_refund(now + Duration::hours(less), now, amount).unwrap();

            prop_assert!(generous.percentage >= strict.percentage);
            prop_assert!(generous.amount_minor_units >= strict.amount_minor_units);
            prop_assert!(generous.amount_minor_units <= amount + 50);
        }
    }

    #[test]
    fn test_parse_time_of_day_rejects_garbage() {
        assert_eq!(parse_time_of_day("25:00"), None);
        assert_eq!(
            parse_time_of_day("7:05"),
            NaiveTime::from_hms_opt(7, 5, 0)
        );
    }
}
