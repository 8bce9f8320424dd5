//! Catch-up generation for recurring transaction series.

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::Transaction;

/// Upper bound on instances emitted per series in one pass. Keeps a stale
/// ledger from flooding the store when the app has not run for a long time.
const MAX_CATCHUP_INSTANCES: usize = 1024;

/// Expands every recurring series up to `today`, exactly once.
///
/// Each series is the set of transactions sharing a `recurrence_group_id`;
/// the template is the one instance still carrying the rule. The cursor
/// always advances from the chronologically latest existing instance, so
/// invoking this again on an already caught-up set yields nothing. The
/// once-per-day gate around it is a scheduling concern, not a correctness
/// requirement.
pub fn generate_due_instances(transactions: &[Transaction], today: NaiveDate) -> Vec<Transaction> {
    let mut series: HashMap<Uuid, Vec<&Transaction>> = HashMap::new();
    for txn in transactions {
        let key = txn
            .recurrence_group_id
            .or_else(|| txn.recurrence.map(|_| txn.id));
        if let Some(group_id) = key {
            series.entry(group_id).or_default().push(txn);
        }
    }

    let mut creations = Vec::new();
    for (group_id, members) in series {
        let template = match members.iter().find(|txn| txn.recurrence.is_some()) {
            Some(template) => *template,
            None => {
                // Orphaned instances; their template was deleted.
                tracing::debug!(%group_id, "recurring series without template, skipping");
                continue;
            }
        };
        let rule = template.recurrence.expect("template carries a rule");
        let latest = members
            .iter()
            .map(|txn| txn.date)
            .max()
            .unwrap_or(template.date);

        let mut cursor = rule.frequency.next_date(latest);
        let mut emitted = 0usize;
        while cursor <= today && emitted < MAX_CATCHUP_INSTANCES {
            let mut instance = template.clone();
            instance.id = Uuid::new_v4();
            instance.date = cursor;
            instance.recurrence = None;
            instance.recurrence_group_id = Some(group_id);
            instance.forecast = true;
            instance.settled = false;
            creations.push(instance);
            cursor = rule.frequency.next_date(cursor);
            emitted += 1;
        }
    }

    creations.sort_by_key(|txn| txn.date);
    creations
}
