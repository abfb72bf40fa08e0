//! Statistics Aggregator
//!
//! Read-only derivation of participation metrics from all shifts and all
//! volunteer accounts. Grouped maps keep the order in which tasks are first
//! seen.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use utoipa::ToSchema;

use crate::shared::error::Result;
use crate::shift::entity::Shift;
use crate::shift::repository::ShiftRepository;
use crate::user::entity::{Role, User};
use crate::user::repository::UserRepository;

/// Hours credited per completed shift, independent of the shift's time range
pub const HOURS_PER_SHIFT: u64 = 4;

pub const TOP_VOLUNTEERS_LIMIT: usize = 15;

/// Placeholder until shifts carry ratings
pub const AVERAGE_RATING: f64 = 4.5;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VolunteerHours {
    pub volunteer_id: String,
    pub name: String,
    pub shifts_count: u64,
    pub hours_worked: u64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_volunteers: u64,
    pub total_shifts: u64,
    /// Shifts with at least one assignee; the `completed` flag is not consulted
    pub completed_shifts: u64,
    pub shifts_left: u64,
    pub average_hours: u64,
    pub average_rating: f64,
    pub top_volunteers: Vec<VolunteerHours>,
    #[schema(value_type = Object)]
    pub shifts_by_task: IndexMap<String, u64>,
    #[schema(value_type = Object)]
    pub volunteers_by_task: IndexMap<String, u64>,
    #[schema(value_type = Object)]
    pub hours_by_task: IndexMap<String, u64>,
}

/// Compute statistics over `users` (non-volunteers are ignored) and `shifts`.
pub fn aggregate(users: &[User], shifts: &[Shift]) -> Statistics {
    let volunteers: Vec<&User> = users.iter().filter(|u| u.role == Role::Volunteer).collect();

    let total_volunteers = volunteers.len() as u64;
    let total_shifts = shifts.len() as u64;
    let completed_shifts = shifts.iter().filter(|s| !s.assigned_users.is_empty()).count() as u64;
    let shifts_left = total_shifts - completed_shifts;

    let mut completed_counts: HashMap<&str, u64> = HashMap::new();
    for shift in shifts.iter().filter(|s| s.completed) {
        for user_id in &shift.assigned_users {
            *completed_counts.entry(user_id.as_str()).or_default() += 1;
        }
    }

    let mut ranking: Vec<VolunteerHours> = volunteers
        .iter()
        .map(|v| {
            let shifts_count = completed_counts.get(v.id.as_str()).copied().unwrap_or(0);
            VolunteerHours {
                volunteer_id: v.id.clone(),
                name: v.display_name().to_string(),
                shifts_count,
                hours_worked: shifts_count * HOURS_PER_SHIFT,
            }
        })
        .collect();

    let total_hours: u64 = ranking.iter().map(|v| v.hours_worked).sum();
    let average_hours = rounded_average(total_hours, total_volunteers);

    // Stable sort: ties stay in enumeration order
    ranking.sort_by(|a, b| b.hours_worked.cmp(&a.hours_worked));
    ranking.truncate(TOP_VOLUNTEERS_LIMIT);

    let mut shifts_by_task: IndexMap<String, u64> = IndexMap::new();
    let mut volunteers_by_task: IndexMap<String, u64> = IndexMap::new();
    let mut hours_by_task: IndexMap<String, u64> = IndexMap::new();

    for shift in shifts {
        let task = shift.task_key();
        *shifts_by_task.entry(task.to_string()).or_default() += 1;

        let assignees = shift.assigned_users.len() as u64;
        if assignees == 0 {
            continue;
        }
        *volunteers_by_task.entry(task.to_string()).or_default() += assignees;
        if shift.completed {
            *hours_by_task.entry(task.to_string()).or_default() += assignees * HOURS_PER_SHIFT;
        }
    }

    Statistics {
        total_volunteers,
        total_shifts,
        completed_shifts,
        shifts_left,
        average_hours,
        average_rating: AVERAGE_RATING,
        top_volunteers: ranking,
        shifts_by_task,
        volunteers_by_task,
        hours_by_task,
    }
}

/// `round(total / count)` with halves rounded up; 0 when `count` is 0
fn rounded_average(total: u64, count: u64) -> u64 {
    if count == 0 {
        return 0;
    }
    (2 * total + count) / (2 * count)
}

pub struct StatisticsService {
    user_repo: Arc<dyn UserRepository>,
    shift_repo: Arc<dyn ShiftRepository>,
}

impl StatisticsService {
    pub fn new(user_repo: Arc<dyn UserRepository>, shift_repo: Arc<dyn ShiftRepository>) -> Self {
        Self { user_repo, shift_repo }
    }

    pub async fn compute(&self) -> Result<Statistics> {
        let volunteers = self.user_repo.find_by_role(Role::Volunteer).await?;
        let shifts = self.shift_repo.find_all().await?;
        Ok(aggregate(&volunteers, &shifts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shift::entity::NewShift;

    fn volunteer(username: &str) -> User {
        User::new(username, "hash", Role::Volunteer)
    }

    fn shift(task: &str) -> Shift {
        Shift::new(NewShift {
            date: "2024-10-22".to_string(),
            time: "08:00-11:00".to_string(),
            location: "Festivalcentre".to_string(),
            task: task.to_string(),
            action: None,
        })
    }

    fn completed_shift(task: &str, assignees: &[&User]) -> Shift {
        let mut s = shift(task);
        for user in assignees {
            s.assign(&user.id).unwrap();
        }
        s.complete();
        s
    }

    #[test]
    fn test_empty_store() {
        let stats = aggregate(&[], &[]);
        assert_eq!(stats.total_volunteers, 0);
        assert_eq!(stats.average_hours, 0);
        assert!(stats.top_volunteers.is_empty());
        assert_eq!(stats.average_rating, 4.5);
    }

    #[test]
    fn test_hours_and_ranking() {
        let a = volunteer("a");
        let b = volunteer("b");
        let c = volunteer("c");
        let shifts = vec![
            completed_shift("Bar", &[&b]),
            completed_shift("Bar", &[&b, &c]),
            completed_shift("Information Desk", &[&c]),
            completed_shift("Information Desk", &[&b]),
        ];

        let stats = aggregate(&[a.clone(), b.clone(), c.clone()], &shifts);

        let order: Vec<&str> = stats.top_volunteers.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a"]);
        assert_eq!(stats.top_volunteers[0].shifts_count, 3);
        assert_eq!(stats.top_volunteers[0].hours_worked, 12);
        assert_eq!(stats.top_volunteers[2].hours_worked, 0);
        // (12 + 8 + 0) / 3 = 6.67
        assert_eq!(stats.average_hours, 7);
    }

    #[test]
    fn test_ties_keep_enumeration_order_and_limit() {
        let volunteers: Vec<User> = (0..20).map(|i| volunteer(&format!("v{:02}", i))).collect();
        let stats = aggregate(&volunteers, &[]);

        assert_eq!(stats.top_volunteers.len(), TOP_VOLUNTEERS_LIMIT);
        assert_eq!(stats.top_volunteers[0].name, "v00");
        assert_eq!(stats.top_volunteers[14].name, "v14");
    }

    #[test]
    fn test_completed_shifts_counts_any_assignee() {
        let v = volunteer("v");
        let mut assigned_open = shift("Bar");
        assigned_open.assign(&v.id).unwrap();
        let mut completed_empty = shift("Bar");
        completed_empty.complete();

        let stats = aggregate(&[v.clone()], &[assigned_open, completed_empty, shift("Bar")]);
        assert_eq!(stats.total_shifts, 3);
        assert_eq!(stats.completed_shifts, 1);
        assert_eq!(stats.shifts_left, 2);
        // Assigned but not completed earns nothing
        assert_eq!(stats.top_volunteers[0].hours_worked, 0);
    }

    #[test]
    fn test_task_groupings() {
        let a = volunteer("a");
        let b = volunteer("b");
        let mut open_registration = shift("Registration Desk");
        open_registration.assign(&a.id).unwrap();

        let shifts = vec![
            shift("Event Support"),
            completed_shift("Bar", &[&a, &b]),
            open_registration,
            shift(""),
        ];
        let stats = aggregate(&[a, b], &shifts);

        let tasks: Vec<&str> = stats.shifts_by_task.keys().map(String::as_str).collect();
        assert_eq!(tasks, vec!["Event Support", "Bar", "Registration Desk", "Other"]);
        assert_eq!(stats.volunteers_by_task.get("Bar"), Some(&2));
        assert_eq!(stats.volunteers_by_task.get("Registration Desk"), Some(&1));
        assert!(!stats.volunteers_by_task.contains_key("Event Support"));
        assert_eq!(stats.hours_by_task.get("Bar"), Some(&8));
        assert!(!stats.hours_by_task.contains_key("Registration Desk"));
    }

    #[test]
    fn test_non_volunteers_are_ignored() {
        let organizer = User::new("boss", "hash", Role::Organizer);
        let stats = aggregate(&[organizer.clone()], &[completed_shift("Bar", &[&organizer])]);
        assert_eq!(stats.total_volunteers, 0);
        assert!(stats.top_volunteers.is_empty());
    }

    #[test]
    fn test_name_falls_back_to_username() {
        let mut named = volunteer("jdoe");
        named.name = "Jane Doe".to_string();
        let stats = aggregate(&[named, volunteer("anon")], &[]);
        assert_eq!(stats.top_volunteers[0].name, "Jane Doe");
        assert_eq!(stats.top_volunteers[1].name, "anon");
    }

    #[test]
    fn test_rounded_average_half_up() {
        assert_eq!(rounded_average(6, 4), 2); // 1.5
        assert_eq!(rounded_average(5, 4), 1); // 1.25
        assert_eq!(rounded_average(0, 0), 0);
    }
}
