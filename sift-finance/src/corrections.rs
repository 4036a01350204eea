//! Virtual debit corrections.
//!
//! A virtual debit purchase that the bank later corrects or refunds shows up
//! twice with the same reference id. Both entries cancel out and are dropped
//! from reports.

use log::debug;
use sift_core::Transaction;
use std::collections::HashMap;

/// Drop each purchase together with the later correction/refund that shares
/// its debit reference. Unpaired entries are kept in order.
pub fn drop_corrected_debits(txns: Vec<Transaction>) -> Vec<Transaction> {
    let before = txns.len();
    let mut open: HashMap<String, usize> = HashMap::new();
    let mut dropped = vec![false; txns.len()];

    for (i, txn) in txns.iter().enumerate() {
        let Some(debit) = &txn.debit_ref else {
            continue;
        };
        if debit.kind.is_reversal() {
            if let Some(purchase) = open.remove(&debit.id) {
                debug!(
                    "removing corrected debit {} \"{}\" ({})",
                    debit.id, txn.description, txn.amount
                );
                dropped[purchase] = true;
                dropped[i] = true;
            }
        } else {
            open.insert(debit.id.clone(), i);
        }
    }

    let kept: Vec<Transaction> = txns
        .into_iter()
        .zip(dropped)
        .filter_map(|(t, gone)| (!gone).then_some(t))
        .collect();
    debug!("{} of {} transactions remain after debit corrections", kept.len(), before);
    kept
}
