//! Read-side views over the event catalog.
//!
//! Nothing here is stored; callers rebuild the view from the current
//! events and counts on every request.

use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

use crate::models::Event;

/// Events ascending by date; ties keep catalog order.
pub fn sorted_by_date(events: &[Event]) -> Vec<Event> {
    let mut sorted = events.to_vec();
    sorted.sort_by_key(|e| e.date);
    sorted
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClubEvents<T> {
    pub club_name: String,
    pub events: Vec<T>,
}

/// Groups date-sorted events by club. A club appears where its earliest event falls.
pub fn group_by_club(events: &[Event]) -> Vec<ClubEvents<Event>> {
    let mut groups: Vec<ClubEvents<Event>> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for event in sorted_by_date(events) {
        match index.get(&event.club_name) {
            Some(&i) => groups[i].events.push(event),
            None => {
                index.insert(event.club_name.clone(), groups.len());
                groups.push(ClubEvents {
                    club_name: event.club_name.clone(),
                    events: vec![event],
                });
            }
        }
    }
    groups
}

/// Splits into the organizer's own events and everyone else's, both date-sorted.
pub fn split_mine_and_others(events: &[Event], organizer_id: Uuid) -> (Vec<Event>, Vec<Event>) {
    sorted_by_date(events)
        .into_iter()
        .partition(|e| e.is_managed_by(organizer_id))
}

/// An event with its live registration figures.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    #[serde(flatten)]
    pub event: Event,
    pub registration_count: i64,
    pub is_full: bool,
    /// `"count / max"`, or `"count / ∞"` without a limit.
    pub capacity_label: String,
}

impl EventSummary {
    pub fn new(event: Event, registration_count: i64) -> Self {
        let capacity_label = match event.max_registrations {
            Some(limit) => format!("{} / {}", registration_count, limit),
            None => format!("{} / ∞", registration_count),
        };
        Self {
            is_full: event.is_full(registration_count),
            event,
            registration_count,
            capacity_label,
        }
    }
}

/// Attaches counts; events missing from `counts` have none.
pub fn summarize(events: Vec<Event>, counts: &HashMap<Uuid, i64>) -> Vec<EventSummary> {
    events
        .into_iter()
        .map(|e| {
            let count = counts.get(&e.id).copied().unwrap_or(0);
            EventSummary::new(e, count)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::catalog::new_event;
    use crate::testing::{dated_details, organizer};
    use crate::models::Identity;

    fn event(lead: &Identity, title: &str, month: u32, day: u32) -> Event {
        new_event(dated_details(title, 2025, month, day, Some(10)), lead).unwrap()
    }

    #[test]
    fn test_sorted_by_date_is_stable() {
        let lead = organizer("Chess");
        let events = vec![
            event(&lead, "Late", 5, 1),
            event(&lead, "Early A", 1, 1),
            event(&lead, "Early B", 1, 1),
        ];
        let titles: Vec<_> = sorted_by_date(&events).into_iter().map(|e| e.title).collect();
        assert_eq!(titles, vec!["Early A", "Early B", "Late"]);
    }

    #[test]
    fn test_group_by_club_orders_by_earliest_event() {
        let chess = organizer("Chess");
        let drama = organizer("Drama");
        let events = vec![
            event(&chess, "Blitz", 4, 1),
            event(&drama, "Play", 2, 1),
            event(&chess, "Open", 1, 1),
            event(&drama, "Improv", 6, 1),
        ];

        let groups = group_by_club(&events);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].club_name, "Chess");
        let chess_titles: Vec<_> = groups[0].events.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(chess_titles, vec!["Open", "Blitz"]);
        assert_eq!(groups[1].club_name, "Drama");
        assert_eq!(groups[1].events.len(), 2);
    }

    #[test]
    fn test_split_mine_and_others() {
        let me = organizer("Chess");
        let other = organizer("Drama");
        let events = vec![
            event(&other, "Play", 3, 1),
            event(&me, "Blitz", 2, 1),
            event(&me, "Open", 1, 1),
        ];

        let (mine, others) = split_mine_and_others(&events, me.user_id);

        let mine_titles: Vec<_> = mine.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(mine_titles, vec!["Open", "Blitz"]);
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].title, "Play");
    }

    #[test]
    fn test_views_reflect_current_events() {
        let lead = organizer("Chess");
        let mut events = vec![event(&lead, "Open", 1, 1)];
        assert_eq!(group_by_club(&events)[0].events.len(), 1);

        events.push(event(&lead, "Blitz", 2, 1));
        assert_eq!(group_by_club(&events)[0].events.len(), 2);
    }

    #[test]
    fn test_event_summary_labels() {
        let lead = organizer("Chess");
        let limited = event(&lead, "Open", 1, 1);
        let summary = EventSummary::new(limited.clone(), 10);
        assert_eq!(summary.capacity_label, "10 / 10");
        assert!(summary.is_full);

        let mut unlimited = limited;
        unlimited.max_registrations = None;
        let summary = EventSummary::new(unlimited, 3);
        assert_eq!(summary.capacity_label, "3 / ∞");
        assert!(!summary.is_full);
    }

    #[test]
    fn test_summarize_defaults_missing_counts_to_zero() {
        let lead = organizer("Chess");
        let first = event(&lead, "Open", 1, 1);
        let second = event(&lead, "Blitz", 2, 1);
        let counts = HashMap::from([(first.id, 4)]);

        let summaries = summarize(vec![first, second], &counts);

        assert_eq!(summaries[0].registration_count, 4);
        assert_eq!(summaries[1].registration_count, 0);
        let json = serde_json::to_value(&summaries[0]).unwrap();
        assert_eq!(json["title"], "Open");
        assert_eq!(json["registrationCount"], 4);
    }
}
