use crate::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use crate::entity::{Book, BookIsbn};
use crate::KernelError;

#[async_trait::async_trait]
pub trait BookQuery: 'static + Sync + Send {
    type Transaction: Transaction;
    async fn find_all(&self, con: &mut Self::Transaction)
        -> error_stack::Result<Vec<Book>, KernelError>;
    async fn find_by_isbn(
        &self,
        con: &mut Self::Transaction,
        isbn: &BookIsbn,
    ) -> error_stack::Result<Option<Book>, KernelError>;
    /// Same as [`BookQuery::find_by_isbn`], but other transactions cannot modify the
    /// returned book until `con` ends.
    async fn find_by_isbn_for_update(
        &self,
        con: &mut Self::Transaction,
        isbn: &BookIsbn,
    ) -> error_stack::Result<Option<Book>, KernelError>;
    /// Locks the book, if any, the same way [`BookQuery::find_by_isbn_for_update`] does.
    async fn exists_by_isbn(
        &self,
        con: &mut Self::Transaction,
        isbn: &BookIsbn,
    ) -> error_stack::Result<bool, KernelError>;
    /// Case-insensitive substring match on the title.
    async fn search_by_title(
        &self,
        con: &mut Self::Transaction,
        title: &str,
    ) -> error_stack::Result<Vec<Book>, KernelError>;
}

pub trait DependOnBookQuery: 'static + Sync + Send + DependOnDatabaseConnection {
    type BookQuery: BookQuery<
        Transaction = <Self::DatabaseConnection as DatabaseConnection>::Transaction,
    >;
    fn book_query(&self) -> &Self::BookQuery;
}
