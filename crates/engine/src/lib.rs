//! Ledger engine of the finance bot.
//!
//! The crate keeps an append-only list of inflow/outflow transactions in a
//! single JSON document and turns text commands into ledger operations:
//!
//! - [`LedgerStore`] loads and saves the document under one lock.
//! - [`Ledger`] appends, totals and paginates in memory.
//! - [`Currency`] renders amounts as `Rp1.234,50`.
//! - [`CommandTable`] maps typed tokens and aliases to [`CommandKind`]s.
//! - [`Dispatcher`] validates a command, runs it and returns one [`Reply`].
//!
//! ```rust
//! # async fn demo() {
//! use engine::{Caller, Dispatcher, Outcome};
//!
//! let dispatcher = Dispatcher::builder().build();
//! let caller = Caller::new(1, 1);
//! dispatcher.dispatch(&caller, "um", &["10000"]).await.unwrap();
//! let summary = dispatcher.dispatch(&caller, "totaluang", &[]).await.unwrap();
//! assert!(matches!(summary, Outcome::Summary { .. }));
//! # }
//! ```

pub use access::{AllowList, Authorizer, Caller};
pub use commands::{CommandKind, CommandOptions, CommandSpec, CommandTable, normalize_token};
pub use currency::Currency;
pub use dispatch::{
    Clock, DEFAULT_PAGE_SIZE, DEFAULT_PREFIX, Dispatcher, DispatcherBuilder, Outcome, Reply,
    ReplyKind, SystemClock,
};
pub use error::{DispatchError, EngineError, LoadError, StoreError, ValidationError};
pub use ledger::{Aggregate, Ledger, Page};
pub use money::Money;
pub use store::{JsonFileStorage, LedgerStore, MemoryStorage, Storage};
pub use transactions::{Transaction, TransactionKind};

mod access;
mod commands;
mod currency;
mod dispatch;
mod error;
mod ledger;
mod money;
mod store;
mod transactions;
