use error_stack::Report;

use kernel::interface::query::BookQuery;
use kernel::interface::update::BookModifier;
use kernel::prelude::entity::{Book, BookIsbn};
use kernel::KernelError;

use crate::database::memory::InMemoryTransaction;

pub struct InMemoryBookRepository;

#[async_trait::async_trait]
impl BookQuery for InMemoryBookRepository {
    type Transaction = InMemoryTransaction;

    async fn find_all(
        &self,
        con: &mut InMemoryTransaction,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        Ok(con.table().rows.values().cloned().collect())
    }

    async fn find_by_isbn(
        &self,
        con: &mut InMemoryTransaction,
        isbn: &BookIsbn,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        Ok(con.table().rows.get(isbn.as_ref()).cloned())
    }

    // The transaction already owns the whole table.
    async fn find_by_isbn_for_update(
        &self,
        con: &mut InMemoryTransaction,
        isbn: &BookIsbn,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        self.find_by_isbn(con, isbn).await
    }

    async fn exists_by_isbn(
        &self,
        con: &mut InMemoryTransaction,
        isbn: &BookIsbn,
    ) -> error_stack::Result<bool, KernelError> {
        Ok(con.table().rows.contains_key(isbn.as_ref()))
    }

    async fn search_by_title(
        &self,
        con: &mut InMemoryTransaction,
        title: &str,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let needle = title.to_lowercase();
        Ok(con
            .table()
            .rows
            .values()
            .filter(|book| book.title().as_ref().to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl BookModifier for InMemoryBookRepository {
    type Transaction = InMemoryTransaction;

    async fn upsert(
        &self,
        con: &mut InMemoryTransaction,
        book: &Book,
    ) -> error_stack::Result<Book, KernelError> {
        let table = con.table_mut();
        let isbn = match book.isbn() {
            BookIsbn::Unassigned => {
                table.last_isbn = table
                    .last_isbn
                    .checked_add(1)
                    .ok_or_else(|| {
                        Report::new(KernelError::Internal)
                            .attach_printable("isbn sequence is exhausted")
                    })?;
                table.last_isbn
            }
            BookIsbn::Assigned(isbn) => {
                table.last_isbn = table.last_isbn.max(*isbn);
                *isbn
            }
        };
        let saved = book.clone().reconstruct(|b| b.isbn = BookIsbn::new(isbn));
        table.rows.insert(isbn, saved.clone());
        Ok(saved)
    }

    async fn delete(
        &self,
        con: &mut InMemoryTransaction,
        isbn: &BookIsbn,
    ) -> error_stack::Result<(), KernelError> {
        con.table_mut().rows.remove(isbn.as_ref());
        Ok(())
    }
}
