//! Wipe-and-reload reconciliation.
//!
//! Remote events carry no identity that survives a rerun of the timetable
//! export, so nothing is matched: every remote event inside the window is
//! deleted and every local event inside the window is created again.
//! A pass interrupted between the two phases leaves the window empty until
//! the next successful pass.

use crate::event::{Event, RemoteEvent};
use crate::window::SyncWindow;

/// The mutations one pass will perform.
#[derive(Debug, Clone, Default)]
pub struct MutationPlan {
    pub to_delete: Vec<RemoteEvent>,
    /// In calendar-file order.
    pub to_create: Vec<Event>,
}

impl MutationPlan {
    /// Total number of remote calls the plan will make.
    pub fn len(&self) -> usize {
        self.to_delete.len() + self.to_create.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_delete.is_empty() && self.to_create.is_empty()
    }
}

pub fn reconcile(local: Vec<Event>, remote: Vec<RemoteEvent>, window: &SyncWindow) -> MutationPlan {
    let to_delete: Vec<RemoteEvent> = remote
        .into_iter()
        .filter(|e| window.contains(&e.start))
        .collect();

    let to_create: Vec<Event> = local
        .into_iter()
        .filter(|e| window.contains(&e.start()))
        .collect();

    tracing::debug!(
        delete = to_delete.len(),
        create = to_create.len(),
        cutoff = %window.cutoff,
        include_past = window.include_past,
        "Reconciled"
    );

    MutationPlan {
        to_delete,
        to_create,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifier;
    use chrono::{DateTime, TimeZone, Utc};
    use chrono_tz::Europe::Paris;

    fn local(title: &str, day: u32) -> Event {
        let start = Paris.with_ymd_and_hms(2024, 1, day, 10, 0, 0).unwrap();
        let end = Paris.with_ymd_and_hms(2024, 1, day, 12, 0, 0).unwrap();
        Event::new(title, "", "", start, end, &Classifier::default()).unwrap()
    }

    fn remote(id: &str, day: u32) -> RemoteEvent {
        RemoteEvent {
            id: id.to_string(),
            start: Utc.with_ymd_and_hms(2024, 1, day, 9, 0, 0).unwrap(),
            summary: id.to_string(),
        }
    }

    fn cutoff(day: u32) -> DateTime<Utc> {
        Paris
            .with_ymd_and_hms(2024, 1, day, 0, 0, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_remote_event_before_cutoff_is_kept() {
        let window = SyncWindow::from_cutoff(cutoff(10));

        let plan = reconcile(vec![], vec![remote("old", 5)], &window);

        assert!(plan.to_delete.is_empty());
    }

    #[test]
    fn test_window_splits_both_sides() {
        let window = SyncWindow::from_cutoff(cutoff(10));

        let plan = reconcile(
            vec![local("CM Past", 9), local("CM Today", 10), local("TD Later", 20)],
            vec![remote("past", 9), remote("today", 10), remote("later", 20)],
            &window,
        );

        let deleted: Vec<_> = plan.to_delete.iter().map(|e| e.id.as_str()).collect();
        let created: Vec<_> = plan.to_create.iter().map(|e| e.title()).collect();

        assert_eq!(deleted, vec!["today", "later"]);
        assert_eq!(created, vec!["CM Today", "TD Later"]);
        assert_eq!(plan.len(), 4);
    }

    #[test]
    fn test_include_past_wipes_everything() {
        let plan = reconcile(
            vec![local("CM A", 1), local("CM B", 28)],
            vec![remote("a", 1), remote("b", 28)],
            &SyncWindow::everything(),
        );

        assert_eq!(plan.to_delete.len(), 2);
        assert_eq!(plan.to_create.len(), 2);
    }

    #[test]
    fn test_creation_order_follows_source_order() {
        let plan = reconcile(
            vec![local("TD Late", 25), local("CM Early", 11), local("TP Mid", 15)],
            vec![],
            &SyncWindow::from_cutoff(cutoff(10)),
        );

        let created: Vec<_> = plan.to_create.iter().map(|e| e.title()).collect();
        assert_eq!(created, vec!["TD Late", "CM Early", "TP Mid"]);
    }

    #[test]
    fn test_identical_events_are_not_matched() {
        // Same title and time on both sides still means delete + create
        let plan = reconcile(
            vec![local("CM Algorithms", 15)],
            vec![RemoteEvent {
                id: "g-1".into(),
                start: local("CM Algorithms", 15).start().with_timezone(&Utc),
                summary: "CM Algorithms".into(),
            }],
            &SyncWindow::from_cutoff(cutoff(10)),
        );

        assert_eq!(plan.to_delete.len(), 1);
        assert_eq!(plan.to_create.len(), 1);
    }

    #[test]
    fn test_empty_plan() {
        let plan = reconcile(vec![], vec![], &SyncWindow::everything());

        assert!(plan.is_empty());
        assert_eq!(plan.len(), 0);
    }
}
