use crate::timetable::models::Activity;

/// Sort the activities by time then class, and number them.
///
/// The sort is stable: activities sharing both keys keep their discovery
/// order, so the output is the same on every run.
pub fn index(mut activities: Vec<Activity>) -> Vec<Activity> {
    activities.sort_by(|a, b| {
        a.timeslot
            .total_cmp(&b.timeslot)
            .then_with(|| a.class_groups.cmp(&b.class_groups))
    });

    for (idx, activity) in activities.iter_mut().enumerate() {
        activity.idx = idx;
    }

    activities
}

#[cfg(test)]
mod tests {
    use super::*;

    fn activity(timeslot: f64, class_groups: &str, module: &str) -> Activity {
        Activity {
            idx: 0,
            day: String::new(),
            timeslot,
            lecturer: String::new(),
            module: module.into(),
            dept: String::new(),
            class_groups: class_groups.into(),
            act_type: String::new(),
            weeks: String::new(),
            duration: 0.25,
            room: String::new(),
        }
    }

    #[test]
    fn ties_broken_by_class() {
        let sorted = index(vec![activity(5.0, "B", "b"), activity(5.0, "A", "a")]);
        assert_eq!(sorted[0].class_groups, "A");
        assert_eq!(sorted[0].idx, 0);
        assert_eq!(sorted[1].class_groups, "B");
        assert_eq!(sorted[1].idx, 1);
    }

    #[test]
    fn timeslot_first() {
        let sorted = index(vec![
            activity(27.5, "A", "thu"),
            activity(0.25, "Z", "mon"),
            activity(9.0, "M", "tue"),
        ]);
        let modules: Vec<_> = sorted.iter().map(|a| a.module.as_str()).collect();
        assert_eq!(modules, vec!["mon", "tue", "thu"]);
    }

    #[test]
    fn equal_keys_keep_discovery_order() {
        let sorted = index(vec![
            activity(1.0, "A", "first"),
            activity(0.0, "A", "zero"),
            activity(1.0, "A", "second"),
            activity(1.0, "A", "third"),
        ]);
        let modules: Vec<_> = sorted.iter().map(|a| a.module.as_str()).collect();
        assert_eq!(modules, vec!["zero", "first", "second", "third"]);
    }

    #[test]
    fn indices_are_contiguous() {
        let sorted = index((0..20).rev().map(|i| activity(f64::from(i) * 0.5, "C", "m")).collect());
        for (pos, a) in sorted.iter().enumerate() {
            assert_eq!(a.idx, pos);
        }
        assert!(sorted.windows(2).all(|w| w[0].timeslot <= w[1].timeslot));
    }

    #[test]
    fn empty_is_fine() {
        assert!(index(vec![]).is_empty());
    }
}
