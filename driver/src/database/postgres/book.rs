use rust_decimal::Decimal;
use sqlx::PgConnection;
use time::Date;

use kernel::interface::query::BookQuery;
use kernel::interface::update::BookModifier;
use kernel::prelude::entity::{
    Book, BookAuthor, BookGenre, BookIsbn, BookPrice, BookStock, BookTitle, PublicationDate,
};
use kernel::KernelError;

use crate::database::postgres::PostgresTransaction;
use crate::error::ConvertError;

pub struct PostgresBookRepository;

#[async_trait::async_trait]
impl BookQuery for PostgresBookRepository {
    type Transaction = PostgresTransaction;

    async fn find_all(
        &self,
        con: &mut PostgresTransaction,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        PgBookInternal::find_all(con).await
    }

    async fn find_by_isbn(
        &self,
        con: &mut PostgresTransaction,
        isbn: &BookIsbn,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::find_by_isbn(con, isbn, false).await
    }

    async fn find_by_isbn_for_update(
        &self,
        con: &mut PostgresTransaction,
        isbn: &BookIsbn,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        PgBookInternal::find_by_isbn(con, isbn, true).await
    }

    async fn exists_by_isbn(
        &self,
        con: &mut PostgresTransaction,
        isbn: &BookIsbn,
    ) -> error_stack::Result<bool, KernelError> {
        PgBookInternal::exists_by_isbn(con, isbn).await
    }

    async fn search_by_title(
        &self,
        con: &mut PostgresTransaction,
        title: &str,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        PgBookInternal::search_by_title(con, title).await
    }
}

#[async_trait::async_trait]
impl BookModifier for PostgresBookRepository {
    type Transaction = PostgresTransaction;

    async fn upsert(
        &self,
        con: &mut PostgresTransaction,
        book: &Book,
    ) -> error_stack::Result<Book, KernelError> {
        PgBookInternal::upsert(con, book).await
    }

    async fn delete(
        &self,
        con: &mut PostgresTransaction,
        isbn: &BookIsbn,
    ) -> error_stack::Result<(), KernelError> {
        PgBookInternal::delete(con, isbn).await
    }
}

#[derive(sqlx::FromRow)]
struct BookRow {
    isbn: i32,
    title: String,
    author: String,
    genre: Option<String>,
    price: Decimal,
    quantity_in_stock: i32,
    publication_date: Option<Date>,
}

impl From<BookRow> for Book {
    fn from(value: BookRow) -> Self {
        Book::new(
            BookIsbn::new(value.isbn),
            BookTitle::new(value.title),
            BookAuthor::new(value.author),
            value.genre.map(BookGenre::new),
            BookPrice::new(value.price),
            BookStock::new(value.quantity_in_stock),
            value.publication_date.map(PublicationDate::new),
        )
    }
}

pub(in crate::database) struct PgBookInternal;

impl PgBookInternal {
    async fn find_all(con: &mut PgConnection) -> error_stack::Result<Vec<Book>, KernelError> {
        let rows = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT isbn, title, author, genre, price, quantity_in_stock, publication_date
            FROM book
            ORDER BY isbn
            "#,
        )
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn find_by_isbn(
        con: &mut PgConnection,
        isbn: &BookIsbn,
        lock: bool,
    ) -> error_stack::Result<Option<Book>, KernelError> {
        // language=postgresql
        let select = r#"
            SELECT isbn, title, author, genre, price, quantity_in_stock, publication_date
            FROM book
            WHERE isbn = $1
            "#;
        // language=postgresql
        let select_for_update = r#"
            SELECT isbn, title, author, genre, price, quantity_in_stock, publication_date
            FROM book
            WHERE isbn = $1
            FOR UPDATE
            "#;
        let row = sqlx::query_as::<_, BookRow>(if lock { select_for_update } else { select })
            .bind(isbn.as_ref())
            .fetch_optional(con)
            .await
            .convert_error()?;
        Ok(row.map(Book::from))
    }

    async fn exists_by_isbn(
        con: &mut PgConnection,
        isbn: &BookIsbn,
    ) -> error_stack::Result<bool, KernelError> {
        let row = sqlx::query_scalar::<_, i32>(
            // language=postgresql
            r#"
            SELECT isbn
            FROM book
            WHERE isbn = $1
            FOR UPDATE
            "#,
        )
        .bind(isbn.as_ref())
        .fetch_optional(con)
        .await
        .convert_error()?;
        Ok(row.is_some())
    }

    async fn search_by_title(
        con: &mut PgConnection,
        title: &str,
    ) -> error_stack::Result<Vec<Book>, KernelError> {
        let rows = sqlx::query_as::<_, BookRow>(
            // language=postgresql
            r#"
            SELECT isbn, title, author, genre, price, quantity_in_stock, publication_date
            FROM book
            WHERE strpos(lower(title), lower($1)) > 0
            ORDER BY isbn
            "#,
        )
        .bind(title)
        .fetch_all(con)
        .await
        .convert_error()?;
        Ok(rows.into_iter().map(Book::from).collect())
    }

    async fn upsert(con: &mut PgConnection, book: &Book) -> error_stack::Result<Book, KernelError> {
        let row = match book.isbn() {
            BookIsbn::Unassigned => {
                sqlx::query_as::<_, BookRow>(
                    // language=postgresql
                    r#"
                    INSERT INTO book (title, author, genre, price, quantity_in_stock, publication_date)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    RETURNING isbn, title, author, genre, price, quantity_in_stock, publication_date
                    "#,
                )
                .bind(book.title().as_ref())
                .bind(book.author().as_ref())
                .bind(book.genre().clone().map(String::from))
                .bind(book.price().as_ref())
                .bind(book.quantity_in_stock().as_ref())
                .bind(book.publication_date().map(Date::from))
                .fetch_one(con)
                .await
                .convert_error()?
            }
            BookIsbn::Assigned(isbn) => {
                let row = sqlx::query_as::<_, BookRow>(
                    // language=postgresql
                    r#"
                    INSERT INTO book (isbn, title, author, genre, price, quantity_in_stock, publication_date)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    ON CONFLICT (isbn) DO UPDATE
                    SET title = EXCLUDED.title,
                        author = EXCLUDED.author,
                        genre = EXCLUDED.genre,
                        price = EXCLUDED.price,
                        quantity_in_stock = EXCLUDED.quantity_in_stock,
                        publication_date = EXCLUDED.publication_date
                    RETURNING isbn, title, author, genre, price, quantity_in_stock, publication_date
                    "#,
                )
                .bind(isbn)
                .bind(book.title().as_ref())
                .bind(book.author().as_ref())
                .bind(book.genre().clone().map(String::from))
                .bind(book.price().as_ref())
                .bind(book.quantity_in_stock().as_ref())
                .bind(book.publication_date().map(Date::from))
                .fetch_one(&mut *con)
                .await
                .convert_error()?;
                Self::advance_isbn_sequence(con, *isbn).await?;
                row
            }
        };
        Ok(Book::from(row))
    }

    // An explicit isbn does not move the serial sequence, so later inserts would collide with it.
    async fn advance_isbn_sequence(
        con: &mut PgConnection,
        isbn: i32,
    ) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        sqlx::query(
            r#"
            SELECT setval(seq, GREATEST($1::bigint, COALESCE(pg_sequence_last_value(seq), 0)))
            FROM (SELECT pg_get_serial_sequence('book', 'isbn')::regclass AS seq) AS serial
            "#,
        )
        .bind(isbn)
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }

    async fn delete(con: &mut PgConnection, isbn: &BookIsbn) -> error_stack::Result<(), KernelError> {
        // language=postgresql
        sqlx::query(
            r#"
            DELETE FROM book
            WHERE isbn = $1
            "#,
        )
        .bind(isbn.as_ref())
        .execute(con)
        .await
        .convert_error()?;
        Ok(())
    }
}
