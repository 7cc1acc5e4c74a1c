//! Transaction primitives.
//!
//! A `Transaction` is one recorded movement of money in or out of the ledger.
//! It is created by [`Ledger::append`](crate::Ledger::append) and never
//! changed afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Money;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[serde(alias = "masuk")]
    Inflow,
    #[serde(alias = "keluar")]
    Outflow,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inflow => "inflow",
            Self::Outflow => "outflow",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub amount: Money,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub(crate) fn new(kind: TransactionKind, amount: Money, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            amount,
            timestamp,
        }
    }
}
