//! In-memory ledger operations.
//!
//! A [`Ledger`] is loaded from the store for every command, changed here and
//! saved back. Nothing in this module touches storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};

use crate::{EngineError, Money, Transaction, TransactionKind};

/// Ordered list of transactions, oldest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default, deserialize_with = "null_as_empty")]
    transactions: Vec<Transaction>,
}

/// Older documents store a cleared ledger as `"transactions": null`.
///
/// A document whose totals do not fit in [`Money`] is rejected here, so a
/// loaded ledger can always be aggregated.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Transaction>, D::Error> {
    let transactions = Option::<Vec<Transaction>>::deserialize(deserializer)?.unwrap_or_default();
    totals(&transactions).map_err(de::Error::custom)?;
    Ok(transactions)
}

fn totals(transactions: &[Transaction]) -> Result<Aggregate, EngineError> {
    transactions
        .iter()
        .try_fold(Aggregate::default(), |acc, tx| acc.with(tx.kind, tx.amount))
        .ok_or(EngineError::TotalsOverflow)
}

/// Totals over every transaction of a ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub total_in: Money,
    pub total_out: Money,
    pub net: Money,
    pub count: usize,
}

impl Aggregate {
    /// Totals after one more transaction, `None` when they stop fitting.
    fn with(self, kind: TransactionKind, amount: Money) -> Option<Self> {
        let (total_in, total_out, net) = match kind {
            TransactionKind::Inflow => (
                self.total_in.checked_add(amount)?,
                self.total_out,
                self.net.checked_add(amount)?,
            ),
            TransactionKind::Outflow => (
                self.total_in,
                self.total_out.checked_add(amount)?,
                self.net.checked_sub(amount)?,
            ),
        };
        Some(Self {
            total_in,
            total_out,
            net,
            count: self.count + 1,
        })
    }
}

/// A backward-walking window over the ledger. Page 1 holds the newest
/// transactions; `items` are still in chronological order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub items: Vec<Transaction>,
    pub page: usize,
    pub total_pages: usize,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Appends a transaction at the end. Amounts are assumed validated.
    #[must_use]
    pub fn append(
        mut self,
        kind: TransactionKind,
        amount: Money,
        timestamp: DateTime<Utc>,
    ) -> Self {
        self.push(kind, amount, timestamp);
        self
    }

    pub(crate) fn push(&mut self, kind: TransactionKind, amount: Money, timestamp: DateTime<Utc>) {
        self.transactions
            .push(Transaction::new(kind, amount, timestamp));
    }

    /// Appends a transaction unless the totals would overflow afterwards.
    /// Returns the totals including the new transaction.
    pub(crate) fn try_push(
        &mut self,
        kind: TransactionKind,
        amount: Money,
        timestamp: DateTime<Utc>,
    ) -> Result<Aggregate, EngineError> {
        let aggregate = self
            .aggregate()?
            .with(kind, amount)
            .ok_or(EngineError::TotalsOverflow)?;
        self.push(kind, amount, timestamp);
        Ok(aggregate)
    }

    /// Inflows minus outflows.
    pub fn total(&self) -> Result<Money, EngineError> {
        self.aggregate().map(|aggregate| aggregate.net)
    }

    /// Fails with [`EngineError::TotalsOverflow`] instead of wrapping.
    pub fn aggregate(&self) -> Result<Aggregate, EngineError> {
        totals(&self.transactions)
    }

    /// Number of pages for `page_size`, never less than 1.
    pub fn total_pages(&self, page_size: usize) -> usize {
        let page_size = page_size.max(1);
        self.transactions.len().div_ceil(page_size).max(1)
    }

    /// Returns page `page` (1-indexed, counted from the newest transaction).
    ///
    /// Out-of-range pages are clamped to `[1, total_pages]`. A `page_size` of
    /// 0 is treated as 1.
    pub fn paginate(&self, page: i64, page_size: usize) -> Page {
        let page_size = page_size.max(1);
        let total_pages = self.total_pages(page_size);
        let page = usize::try_from(page.max(1)).map_or(total_pages, |p| p.min(total_pages));

        // The oldest page is short instead of overlapping its neighbour.
        let end = self.transactions.len() - (page - 1) * page_size;
        let start = end.saturating_sub(page_size);

        Page {
            items: self.transactions[start..end].to_vec(),
            page,
            total_pages,
        }
    }

    /// Drops every transaction. There is no way back.
    #[must_use]
    pub fn clear(self) -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 9, minute, 0).unwrap()
    }

    fn ledger_of(amounts: &[(TransactionKind, i64)]) -> Ledger {
        amounts
            .iter()
            .enumerate()
            .fold(Ledger::new(), |ledger, (idx, (kind, major))| {
                ledger.append(*kind, Money::major(*major), at(idx as u32))
            })
    }

    fn inflows(count: i64) -> Ledger {
        let amounts: Vec<_> = (1..=count).map(|v| (TransactionKind::Inflow, v)).collect();
        ledger_of(&amounts)
    }

    fn majors(page: &Page) -> Vec<i64> {
        page.items.iter().map(|tx| tx.amount.minor() / 100).collect()
    }

    #[test]
    fn total_subtracts_outflows() {
        let ledger = ledger_of(&[
            (TransactionKind::Inflow, 10_000),
            (TransactionKind::Outflow, 2_500),
            (TransactionKind::Outflow, 9_000),
        ]);
        assert_eq!(ledger.total().unwrap(), Money::major(-1_500));
    }

    #[test]
    fn total_ignores_ordering() {
        let a = ledger_of(&[
            (TransactionKind::Inflow, 7),
            (TransactionKind::Outflow, 3),
            (TransactionKind::Inflow, 11),
        ]);
        let b = ledger_of(&[
            (TransactionKind::Outflow, 3),
            (TransactionKind::Inflow, 11),
            (TransactionKind::Inflow, 7),
        ]);
        assert_eq!(a.total().unwrap(), b.total().unwrap());
        assert_eq!(a.total().unwrap(), Money::major(15));
    }

    #[test]
    fn aggregate_counts_everything() {
        let ledger = ledger_of(&[
            (TransactionKind::Inflow, 10_000),
            (TransactionKind::Outflow, 2_500),
        ]);
        assert_eq!(
            ledger.aggregate().unwrap(),
            Aggregate {
                total_in: Money::major(10_000),
                total_out: Money::major(2_500),
                net: Money::major(7_500),
                count: 2,
            }
        );
    }

    #[test]
    fn clear_yields_zero_totals() {
        let ledger = inflows(4).clear();
        assert_eq!(ledger.total().unwrap(), Money::ZERO);
        assert_eq!(ledger.aggregate().unwrap().count, 0);
    }

    #[test]
    fn overflowing_totals_are_errors_not_wraps() {
        let near_max = Money::new(i64::MAX - 10);
        let ledger = Ledger::new()
            .append(TransactionKind::Inflow, near_max, at(0))
            .append(TransactionKind::Inflow, Money::new(11), at(1));
        assert_eq!(ledger.aggregate(), Err(EngineError::TotalsOverflow));
        assert_eq!(ledger.total(), Err(EngineError::TotalsOverflow));

        let outflows = Ledger::new()
            .append(TransactionKind::Outflow, near_max, at(0))
            .append(TransactionKind::Outflow, Money::new(20), at(1));
        assert_eq!(outflows.aggregate(), Err(EngineError::TotalsOverflow));
    }

    #[test]
    fn try_push_leaves_the_ledger_untouched_on_overflow() {
        let mut ledger =
            Ledger::new().append(TransactionKind::Inflow, Money::new(i64::MAX - 10), at(0));
        assert_eq!(
            ledger.try_push(TransactionKind::Inflow, Money::new(11), at(1)),
            Err(EngineError::TotalsOverflow)
        );
        assert_eq!(ledger.len(), 1);

        let aggregate = ledger
            .try_push(TransactionKind::Outflow, Money::new(10), at(1))
            .unwrap();
        assert_eq!(aggregate.net, Money::new(i64::MAX - 20));
        assert_eq!(aggregate.count, 2);
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn document_with_overflowing_totals_is_rejected() {
        let entry = r#"{"type":"inflow","amount":90000000000000,"timestamp":"2024-01-01T00:00:00Z"}"#;
        let document =
            |count: usize| format!(r#"{{"transactions":[{}]}}"#, vec![entry; count].join(","));

        let fits: Ledger = serde_json::from_str(&document(1024)).unwrap();
        assert_eq!(fits.total().unwrap(), Money::new(1024 * 9_000_000_000_000_000));
        assert!(serde_json::from_str::<Ledger>(&document(1025)).is_err());
    }

    #[test]
    fn null_or_missing_transactions_load_as_empty() {
        for raw in [r#"{"transactions": null}"#, "{}", r#"{"transactions": []}"#] {
            let ledger: Ledger = serde_json::from_str(raw).unwrap();
            assert!(ledger.is_empty(), "{raw}");
        }
        assert_eq!(
            serde_json::to_string(&Ledger::new()).unwrap(),
            r#"{"transactions":[]}"#
        );
    }

    #[test]
    fn empty_ledger_has_one_empty_page() {
        let page = Ledger::new().paginate(1, 5);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.page, 1);
        assert!(page.items.is_empty());
    }

    #[test]
    fn first_page_holds_newest_in_chronological_order() {
        let ledger = inflows(12);
        assert_eq!(majors(&ledger.paginate(1, 5)), vec![8, 9, 10, 11, 12]);
        assert_eq!(majors(&ledger.paginate(2, 5)), vec![3, 4, 5, 6, 7]);
        assert_eq!(majors(&ledger.paginate(3, 5)), vec![1, 2]);
        assert_eq!(ledger.paginate(3, 5).total_pages, 3);
    }

    #[test]
    fn out_of_range_pages_are_clamped() {
        let ledger = inflows(12);
        assert_eq!(ledger.paginate(0, 5), ledger.paginate(1, 5));
        assert_eq!(ledger.paginate(-7, 5), ledger.paginate(1, 5));
        assert_eq!(ledger.paginate(4, 5), ledger.paginate(3, 5));
        assert_eq!(ledger.paginate(i64::MAX, 5), ledger.paginate(3, 5));
    }

    #[test]
    fn pages_rebuild_the_ledger_exactly_once() {
        for count in 0..=13 {
            let ledger = inflows(count);
            for size in 1..=6 {
                let total_pages = ledger.total_pages(size);
                let rebuilt: Vec<Transaction> = (1..=total_pages as i64)
                    .rev()
                    .flat_map(|page| ledger.paginate(page, size).items)
                    .collect();
                assert_eq!(rebuilt, ledger.transactions(), "count={count} size={size}");
            }
        }
    }
}
