//! Grouped and scalar metrics over the cleaned sales table.

use crate::error::{DashError, DashResult};
use crate::types::{columns, SalesTable, ANNUAL};
use std::collections::HashSet;
use tracing::debug;

/// A small ordered table of `(group key, value)` pairs.
///
/// Keys are unique and kept in first-seen order, so the same input rows
/// always produce the same group order. Carries its header names so the
/// renderer can lay the table out without extra context.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedMetric {
    pub key_header: String,
    pub value_header: String,
    pub rows: Vec<(String, f64)>,
}

impl GroupedMetric {
    pub fn new(key_header: &str, value_header: &str) -> Self {
        Self {
            key_header: key_header.to_string(),
            value_header: value_header.to_string(),
            rows: Vec::new(),
        }
    }

    /// Add `value` to the group `key`, creating the group on first sight.
    pub fn add(&mut self, key: &str, value: f64) {
        match self.rows.iter_mut().find(|(k, _)| k == key) {
            Some((_, total)) => *total += value,
            None => self.rows.push((key.to_string(), value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<f64> {
        self.rows.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    /// Sum over all groups.
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|(_, v)| v).sum()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Everything the report sheets need, computed in one pass over the table.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardMetrics {
    /// Total Value summed over Annual-type records.
    pub annual_revenue: f64,
    /// The annual revenue broken down by Auto Renewal category.
    pub annual_by_auto_renewal: GroupedMetric,
    /// EA Play Season Pass revenue over all records.
    pub ea_play_revenue: f64,
    pub ea_play_by_plan: GroupedMetric,
    /// Minecraft Season Pass revenue over all records.
    pub minecraft_revenue: f64,
    pub minecraft_by_plan: GroupedMetric,
    /// Distinct subscriber identifiers across all records.
    pub total_subscribers: usize,
    /// Average revenue per subscriber: total revenue / distinct subscribers.
    pub arpu: f64,
    /// Distinct subscriber count per plan.
    pub subscribers_by_plan: GroupedMetric,
}

/// Aggregate the cleaned sales table into [`DashboardMetrics`].
///
/// Fails with [`DashError::NoSubscribers`] when the table holds no
/// subscriber identifiers, since ARPU is undefined there.
pub fn aggregate(table: &SalesTable) -> DashResult<DashboardMetrics> {
    let mut annual_revenue = 0.0;
    let mut annual_by_auto_renewal =
        GroupedMetric::new(columns::AUTO_RENEWAL, columns::TOTAL_VALUE);
    let mut ea_play_by_plan = GroupedMetric::new(columns::PLAN, columns::EA_PLAY_PRICE);
    let mut minecraft_by_plan = GroupedMetric::new(columns::PLAN, columns::MINECRAFT_PRICE);

    let mut total_revenue = 0.0;
    let mut subscribers: HashSet<&str> = HashSet::new();
    // Plan -> distinct subscriber ids, plans in first-seen order
    let mut plan_subscribers: Vec<(String, HashSet<&str>)> = Vec::new();

    for record in &table.records {
        if record.subscription_type == ANNUAL {
            annual_revenue += record.total_value;
            annual_by_auto_renewal.add(&record.auto_renewal, record.total_value);
        }

        ea_play_by_plan.add(&record.plan, record.ea_play_price);
        minecraft_by_plan.add(&record.plan, record.minecraft_price);

        total_revenue += record.total_value;
        subscribers.insert(&record.subscriber_id);

        match plan_subscribers.iter_mut().find(|(p, _)| *p == record.plan) {
            Some((_, ids)) => {
                ids.insert(&record.subscriber_id);
            }
            None => {
                let mut ids = HashSet::new();
                ids.insert(record.subscriber_id.as_str());
                plan_subscribers.push((record.plan.clone(), ids));
            }
        }
    }

    let total_subscribers = subscribers.len();
    if total_subscribers == 0 {
        return Err(DashError::NoSubscribers);
    }
    let arpu = total_revenue / total_subscribers as f64;

    let mut subscribers_by_plan = GroupedMetric::new(columns::PLAN, columns::COUNT);
    for (plan, ids) in &plan_subscribers {
        subscribers_by_plan.add(plan, ids.len() as f64);
    }

    debug!(
        records = table.len(),
        subscribers = total_subscribers,
        annual_revenue,
        "aggregated sales table"
    );

    Ok(DashboardMetrics {
        annual_revenue,
        annual_by_auto_renewal,
        ea_play_revenue: ea_play_by_plan.total(),
        ea_play_by_plan,
        minecraft_revenue: minecraft_by_plan.total(),
        minecraft_by_plan,
        total_subscribers,
        arpu,
        subscribers_by_plan,
    })
}
