use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use kernel::interface::database::{DatabaseConnection, Transaction};
use kernel::interface::query::DependOnBookQuery;
use kernel::interface::update::DependOnBookModifier;
use kernel::prelude::entity::Book;
use kernel::KernelError;

pub use self::book::*;

mod book;

#[derive(Debug, Clone, Default)]
pub(in crate::database) struct BookTable {
    rows: BTreeMap<i32, Book>,
    last_isbn: i32,
}

/// Book store kept in process memory.
///
/// A transaction holds the whole table until it ends, so transactions never interleave.
#[derive(Clone, Default)]
pub struct InMemoryDatabase {
    table: Arc<Mutex<BookTable>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }
}

pub struct InMemoryTransaction {
    guard: OwnedMutexGuard<BookTable>,
    staged: Option<BookTable>,
}

impl InMemoryTransaction {
    pub(in crate::database) fn table(&self) -> &BookTable {
        self.staged.as_ref().unwrap_or(&*self.guard)
    }

    // The committed table is copied on the first write only.
    pub(in crate::database) fn table_mut(&mut self) -> &mut BookTable {
        self.staged.get_or_insert_with(|| self.guard.clone())
    }
}

#[async_trait::async_trait]
impl Transaction for InMemoryTransaction {
    async fn commit(mut self) -> error_stack::Result<(), KernelError> {
        match self.staged.take() {
            Some(staged) => {
                *self.guard = staged;
                tracing::debug!("Committed in-memory transaction");
            }
            None => tracing::debug!("Committed read-only in-memory transaction"),
        }
        Ok(())
    }

    async fn roll_back(self) -> error_stack::Result<(), KernelError> {
        tracing::debug!("Discarded in-memory transaction");
        Ok(())
    }
}

#[async_trait::async_trait]
impl DatabaseConnection for InMemoryDatabase {
    type Transaction = InMemoryTransaction;
    async fn transact(&self) -> error_stack::Result<InMemoryTransaction, KernelError> {
        let guard = self.table.clone().lock_owned().await;
        tracing::debug!("Began in-memory transaction");
        Ok(InMemoryTransaction {
            guard,
            staged: None,
        })
    }
}

impl DependOnBookQuery for InMemoryDatabase {
    type BookQuery = InMemoryBookRepository;
    fn book_query(&self) -> &Self::BookQuery {
        &InMemoryBookRepository
    }
}

impl DependOnBookModifier for InMemoryDatabase {
    type BookModifier = InMemoryBookRepository;
    fn book_modifier(&self) -> &Self::BookModifier {
        &InMemoryBookRepository
    }
}
