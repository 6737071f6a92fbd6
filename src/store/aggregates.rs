//! Derived aggregate counters
//!
//! These are cached fields refreshed by one recomputation routine after
//! every mutating operation; they are never computed lazily at read
//! time. `compute` is pure so tests can call it against fixed inputs.

use chrono::NaiveDate;

use crate::entities::{Activity, ActivityStatus, Company, Contact, Expense, Opportunity, Priority};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateCounts {
    pub contacts: usize,
    pub companies: usize,
    pub opportunities: usize,
    /// Opportunities whose status is not terminal
    pub active_opportunities: usize,
    /// High priority AND active
    pub high_priority_opportunities: usize,
    pub activities: usize,
    /// Activities starting today (UTC date of start_time)
    pub today_activities: usize,
    /// Today's activities still in scheduled status
    pub scheduled_today_activities: usize,
    pub expenses: usize,
    /// Sum of amount over closed_win opportunities
    pub won_opportunity_amount: f64,
}

pub fn compute(
    contacts: &[Contact],
    companies: &[Company],
    opportunities: &[Opportunity],
    activities: &[Activity],
    expenses: &[Expense],
    today: NaiveDate,
) -> AggregateCounts {
    AggregateCounts {
        contacts: contacts.len(),
        companies: companies.len(),
        opportunities: opportunities.len(),
        active_opportunities: opportunities.iter().filter(|o| o.status.is_active()).count(),
        high_priority_opportunities: opportunities
            .iter()
            .filter(|o| o.priority == Priority::High && o.status.is_active())
            .count(),
        activities: activities.len(),
        today_activities: activities.iter().filter(|a| a.starts_on(today)).count(),
        scheduled_today_activities: activities
            .iter()
            .filter(|a| a.starts_on(today) && a.status == ActivityStatus::Scheduled)
            .count(),
        expenses: expenses.len(),
        won_opportunity_amount: opportunities
            .iter()
            .filter(|o| o.status == crate::entities::OpportunityStatus::ClosedWin)
            .map(|o| o.amount.unwrap_or(0.0))
            .sum(),
    }
}
