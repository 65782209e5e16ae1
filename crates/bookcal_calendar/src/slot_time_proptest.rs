#[cfg(test)]
mod tests {
    use crate::booking::{Booking, BookingIdGenerator};
    use crate::slot_time::SlotTime;
    use chrono::{Duration, NaiveDate};
    use proptest::prelude::*;
    use std::collections::HashSet;

    // Any minute between 1970 and the end of 2099.
    fn slot_strategy() -> impl Strategy<Value = SlotTime> {
        (0i64..65_745_000).prop_map(|minutes| {
            let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            SlotTime::new(epoch + Duration::minutes(minutes))
        })
    }

    proptest! {
        // A bound written in the wire format reads back as the same minute
        #[test]
        fn test_wire_format_round_trip(slot in slot_strategy()) {
            let wire = slot.to_wire();
            prop_assert_eq!(wire.len(), 16);
            prop_assert_eq!(SlotTime::parse(&wire).unwrap(), slot);
        }

        // Every draft ends one slot length after it starts
        #[test]
        fn test_draft_end_is_start_plus_slot(slot in slot_strategy(), minutes in 1i64..240) {
            let draft = Booking::draft("1".to_string(), slot, Duration::minutes(minutes)).unwrap();
            prop_assert_eq!(draft.end_time.since(draft.start_time), Duration::minutes(minutes));
            prop_assert!(draft.is_available());
        }

        // Ids stay unique even when the clock stalls or jumps back
        #[test]
        fn test_generated_ids_are_unique(clock in prop::collection::vec(1_700_000_000_000i64..1_700_000_000_050, 1..200)) {
            let mut ids = BookingIdGenerator::new();
            let generated: Vec<String> = clock.iter().map(|now| ids.next_at(*now)).collect();
            let distinct: HashSet<&String> = generated.iter().collect();
            prop_assert_eq!(distinct.len(), generated.len());
        }
    }
}
