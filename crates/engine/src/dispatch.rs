//! Command dispatch.
//!
//! One call to [`Dispatcher::dispatch`] handles one inbound command from start
//! to finish and yields exactly one [`Reply`]. Requests that will be rejected
//! are rejected before the store is opened.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::{
    Aggregate, Authorizer, Caller, CommandKind, CommandOptions, CommandSpec, CommandTable,
    DispatchError, Ledger, LedgerStore, Money, Page, TransactionKind, ValidationError,
    access::AllowList,
};

pub const DEFAULT_PAGE_SIZE: usize = 5;
pub const DEFAULT_PREFIX: &str = "?";

/// Successful result of a command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Help(Vec<CommandSpec>),
    Recorded {
        kind: TransactionKind,
        amount: Money,
    },
    Summary {
        aggregate: Aggregate,
        page: Page,
    },
    /// Nothing was deleted yet. `confirm_with` is what the caller must send.
    ClearRequested {
        confirm_with: String,
    },
    Cleared,
}

pub type Reply = Result<Outcome, DispatchError>;

/// Coarse classification of a reply, for presentation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReplyKind {
    Success,
    ValidationError,
    PermissionDenied,
    NotFound,
    StorageError,
}

impl ReplyKind {
    pub fn of(reply: &Reply) -> Self {
        match reply {
            Ok(_) => Self::Success,
            Err(DispatchError::PermissionDenied) => Self::PermissionDenied,
            Err(DispatchError::UnrecognizedCommand { .. }) => Self::NotFound,
            Err(DispatchError::Validation(_)) => Self::ValidationError,
            Err(DispatchError::Storage(_)) => Self::StorageError,
        }
    }
}

/// Source of timestamps for new transactions.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Clone)]
pub struct Dispatcher {
    table: Arc<CommandTable>,
    store: LedgerStore,
    authorizer: Arc<dyn Authorizer>,
    clock: Arc<dyn Clock>,
    page_size: usize,
    prefix: String,
}

impl Dispatcher {
    /// Return a builder for `Dispatcher`.
    pub fn builder() -> DispatcherBuilder {
        DispatcherBuilder::default()
    }

    pub fn table(&self) -> &CommandTable {
        &self.table
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Runs one command. `token` is the command word without prefix, `args`
    /// the remaining whitespace-separated words.
    pub async fn dispatch(&self, caller: &Caller, token: &str, args: &[&str]) -> Reply {
        if !self.authorizer.is_authorized(caller) {
            tracing::warn!(user = caller.user_id, chat = caller.chat_id, "permission denied");
            return Err(DispatchError::PermissionDenied);
        }

        let Some(kind) = self.table.resolve(token) else {
            tracing::warn!(token, "unrecognized command");
            return Err(DispatchError::UnrecognizedCommand {
                token: token.to_string(),
                help: self
                    .table
                    .get(CommandKind::Help)
                    .map(|help| format!("{}{}", self.prefix, help.name)),
            });
        };

        let reply = match kind {
            CommandKind::Help => Ok(Outcome::Help(self.table.iter().cloned().collect())),
            CommandKind::RecordInflow => self.record(TransactionKind::Inflow, args).await,
            CommandKind::RecordOutflow => self.record(TransactionKind::Outflow, args).await,
            CommandKind::ShowTotal => self.summary(args).await,
            CommandKind::ClearRequest => Ok(Outcome::ClearRequested {
                confirm_with: format!("{}{}", self.prefix, CommandKind::ClearConfirm.name()),
            }),
            CommandKind::ClearConfirm => self.clear(caller).await,
        };

        match &reply {
            Err(DispatchError::Validation(err)) => {
                tracing::warn!(command = kind.name(), "rejected arguments: {err}");
            }
            Err(DispatchError::Storage(err)) => {
                tracing::error!(command = kind.name(), "storage failure: {err}");
            }
            _ => {}
        }
        reply
    }

    async fn record(&self, kind: TransactionKind, args: &[&str]) -> Reply {
        let amount = self.parse_amount(kind, args)?;
        let timestamp = self.clock.now();

        let aggregate = self
            .store
            .update(|ledger| {
                ledger
                    .try_push(kind, amount, timestamp)
                    .map_err(|err| DispatchError::from(ValidationError::from(err)))
            })
            .await?;

        tracing::info!(
            kind = kind.as_str(),
            %amount,
            count = aggregate.count,
            "transaction recorded"
        );
        Ok(Outcome::Recorded { kind, amount })
    }

    fn parse_amount(&self, kind: TransactionKind, args: &[&str]) -> Result<Money, ValidationError> {
        let command = match kind {
            TransactionKind::Inflow => CommandKind::RecordInflow,
            TransactionKind::Outflow => CommandKind::RecordOutflow,
        };
        let [raw] = args else {
            return Err(ValidationError::Usage {
                usage: self.table.usage(command, &self.prefix),
            });
        };

        let amount: Money = raw.parse()?;
        if !amount.is_positive() {
            return Err(ValidationError::NotPositive(amount));
        }
        Ok(amount)
    }

    async fn summary(&self, args: &[&str]) -> Reply {
        let page = if self.table.options().pagination {
            args.first()
                .and_then(|raw| raw.trim().parse::<i64>().ok())
                .unwrap_or(1)
        } else {
            1
        };

        let ledger: Ledger = self.store.snapshot().await?;
        Ok(Outcome::Summary {
            aggregate: ledger.aggregate().map_err(ValidationError::from)?,
            page: ledger.paginate(page, self.page_size),
        })
    }

    async fn clear(&self, caller: &Caller) -> Reply {
        // Unconditional: a damaged document is replaced as well.
        self.store.replace(&Ledger::new()).await?;
        tracing::info!(user = caller.user_id, chat = caller.chat_id, "ledger cleared");
        Ok(Outcome::Cleared)
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("table", &self.table)
            .field("store", &self.store)
            .field("page_size", &self.page_size)
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}

pub struct DispatcherBuilder {
    store: Option<LedgerStore>,
    options: CommandOptions,
    authorizer: Arc<dyn Authorizer>,
    clock: Arc<dyn Clock>,
    page_size: usize,
    prefix: String,
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self {
            store: None,
            options: CommandOptions::default(),
            authorizer: Arc::new(AllowList::open()),
            clock: Arc::new(SystemClock),
            page_size: DEFAULT_PAGE_SIZE,
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

impl DispatcherBuilder {
    pub fn store(mut self, store: LedgerStore) -> DispatcherBuilder {
        self.store = Some(store);
        self
    }

    pub fn options(mut self, options: CommandOptions) -> DispatcherBuilder {
        self.options = options;
        self
    }

    pub fn authorizer(mut self, authorizer: impl Authorizer + 'static) -> DispatcherBuilder {
        self.authorizer = Arc::new(authorizer);
        self
    }

    pub fn clock(mut self, clock: impl Clock + 'static) -> DispatcherBuilder {
        self.clock = Arc::new(clock);
        self
    }

    /// Transactions per page of `totaluang`. 0 is raised to 1.
    pub fn page_size(mut self, page_size: usize) -> DispatcherBuilder {
        self.page_size = page_size.max(1);
        self
    }

    pub fn prefix(mut self, prefix: &str) -> DispatcherBuilder {
        self.prefix = prefix.to_string();
        self
    }

    /// Construct `Dispatcher`. Without a store the ledger lives in memory.
    pub fn build(self) -> Dispatcher {
        Dispatcher {
            table: Arc::new(CommandTable::new(self.options)),
            store: self.store.unwrap_or_else(LedgerStore::in_memory),
            authorizer: self.authorizer,
            clock: self.clock,
            page_size: self.page_size,
            prefix: self.prefix,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher() -> Dispatcher {
        Dispatcher::builder().build()
    }

    fn caller() -> Caller {
        Caller::new(1, 1)
    }

    #[tokio::test]
    async fn reply_kinds_cover_the_taxonomy() {
        let d = Dispatcher::builder()
            .authorizer(|c: &Caller| c.user_id == 1)
            .build();
        assert_eq!(
            ReplyKind::of(&d.dispatch(&caller(), "help", &[]).await),
            ReplyKind::Success
        );
        assert_eq!(
            ReplyKind::of(&d.dispatch(&Caller::new(2, 1), "help", &[]).await),
            ReplyKind::PermissionDenied
        );
        assert_eq!(
            ReplyKind::of(&d.dispatch(&caller(), "bogus", &[]).await),
            ReplyKind::NotFound
        );
        assert_eq!(
            ReplyKind::of(&d.dispatch(&caller(), "um", &["abc"]).await),
            ReplyKind::ValidationError
        );
    }

    #[tokio::test]
    async fn record_requires_exactly_one_argument() {
        let d = dispatcher();
        for args in [&[][..], &["1", "2"][..]] {
            let err = d.dispatch(&caller(), "uangmasuk", args).await.unwrap_err();
            assert!(matches!(
                err,
                DispatchError::Validation(ValidationError::Usage { .. })
            ));
        }
    }

    #[tokio::test]
    async fn non_positive_amounts_are_rejected() {
        let d = dispatcher();
        for raw in ["0", "-5", "0.001"] {
            let err = d.dispatch(&caller(), "uk", &[raw]).await.unwrap_err();
            assert!(
                matches!(err, DispatchError::Validation(ValidationError::NotPositive(_))),
                "{raw}"
            );
        }
    }

    #[tokio::test]
    async fn unrecognized_command_points_to_help() {
        let err = dispatcher()
            .dispatch(&caller(), "bogus", &[])
            .await
            .unwrap_err();
        match err {
            DispatchError::UnrecognizedCommand { token, help } => {
                assert_eq!(token, "bogus");
                assert_eq!(help.as_deref(), Some("?help"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn clear_request_only_prompts() {
        let d = dispatcher();
        d.dispatch(&caller(), "um", &["100"]).await.unwrap();
        let reply = d.dispatch(&caller(), "hapus", &[]).await.unwrap();
        assert_eq!(
            reply,
            Outcome::ClearRequested {
                confirm_with: "?confirmclear".to_string()
            }
        );
        let Outcome::Summary { aggregate, .. } = d.dispatch(&caller(), "tu", &[]).await.unwrap()
        else {
            panic!("expected summary");
        };
        assert_eq!(aggregate.count, 1);
    }

    #[tokio::test]
    async fn non_numeric_page_falls_back_to_first() {
        let d = Dispatcher::builder().page_size(1).build();
        for amount in ["1", "2", "3"] {
            d.dispatch(&caller(), "um", &[amount]).await.unwrap();
        }
        let first = d.dispatch(&caller(), "tu", &["abc"]).await.unwrap();
        let explicit = d.dispatch(&caller(), "tu", &["1"]).await.unwrap();
        assert_eq!(first, explicit);
        let Outcome::Summary { page, .. } = d.dispatch(&caller(), "tu", &["99"]).await.unwrap()
        else {
            panic!("expected summary");
        };
        assert_eq!((page.page, page.total_pages), (3, 3));
    }

    #[tokio::test]
    async fn pagination_off_ignores_page_argument() {
        let d = Dispatcher::builder()
            .page_size(1)
            .options(CommandOptions {
                pagination: false,
                ..CommandOptions::default()
            })
            .build();
        for amount in ["1", "2"] {
            d.dispatch(&caller(), "um", &[amount]).await.unwrap();
        }
        let Outcome::Summary { page, .. } = d.dispatch(&caller(), "tu", &["2"]).await.unwrap()
        else {
            panic!("expected summary");
        };
        assert_eq!(page.page, 1);
        assert_eq!(page.items[0].amount, Money::major(2));
    }
}
