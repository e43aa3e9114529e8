use error_stack::Report;

use kernel::interface::database::{DatabaseConnection, DependOnDatabaseConnection, Transaction};
use kernel::interface::query::{BookQuery, DependOnBookQuery};
use kernel::interface::update::{BookModifier, DependOnBookModifier};
use kernel::prelude::entity::{Book, BookIsbn, BookPatch};
use kernel::KernelError;

use crate::transfer::{
    BookDto, CheckStockDto, CreateBookDto, DeleteBookDto, GetBookDto, PatchBookDto,
    PurchaseBookDto, PurchaseDto, SearchBookDto, StockDto, UpdateBookDto,
};

#[async_trait::async_trait]
pub trait GetBookService: 'static + Sync + Send + DependOnBookQuery {
    async fn get_all_books(&self) -> error_stack::Result<Vec<BookDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        tracing::info!("Fetching all books from the inventory");
        let books = self.book_query().find_all(&mut connection).await?;
        Ok(books.into_iter().map(BookDto::from).collect())
    }

    async fn get_book(&self, dto: GetBookDto) -> error_stack::Result<Option<BookDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        tracing::info!(isbn = dto.isbn, "Fetching book");
        let isbn = BookIsbn::new(dto.isbn);
        let book = self.book_query().find_by_isbn(&mut connection, &isbn).await?;
        Ok(book.map(BookDto::from))
    }

    async fn search_books(
        &self,
        dto: SearchBookDto,
    ) -> error_stack::Result<Vec<BookDto>, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        tracing::info!(title = %dto.title, "Searching books by title");
        let books = self
            .book_query()
            .search_by_title(&mut connection, &dto.title)
            .await?;
        Ok(books.into_iter().map(BookDto::from).collect())
    }

    async fn check_stock(&self, dto: CheckStockDto) -> error_stack::Result<StockDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let isbn = BookIsbn::new(dto.isbn);
        let book = self
            .book_query()
            .find_by_isbn(&mut connection, &isbn)
            .await?
            .ok_or_else(|| Report::new(KernelError::not_found(dto.isbn)))?;
        Ok(StockDto {
            isbn: dto.isbn,
            quantity_in_stock: *book.quantity_in_stock().as_ref(),
        })
    }
}

impl<T> GetBookService for T where T: DependOnBookQuery {}

#[async_trait::async_trait]
pub trait SaveBookService: 'static + Sync + Send + DependOnBookModifier {
    /// Inserts the book when its isbn is unassigned, otherwise replaces the stored book.
    async fn save_book(&self, dto: BookDto) -> error_stack::Result<BookDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let book = Book::try_from(dto)?;
        let saved = self.book_modifier().upsert(&mut connection, &book).await?;
        connection.commit().await?;

        tracing::info!(isbn = i32::from(*saved.isbn()), "Saved book");
        Ok(BookDto::from(saved))
    }

    async fn create_book(&self, dto: CreateBookDto) -> error_stack::Result<BookDto, KernelError> {
        self.save_book(BookDto::from(dto)).await
    }
}

impl<T> SaveBookService for T where T: DependOnBookModifier {}

#[async_trait::async_trait]
pub trait UpdateBookService:
    'static + Sync + Send + DependOnBookQuery + DependOnBookModifier
{
    async fn update_book(&self, dto: UpdateBookDto) -> error_stack::Result<BookDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        tracing::info!(isbn = dto.isbn, "Updating book");
        let isbn = BookIsbn::new(dto.isbn);
        let mut book = self
            .book_query()
            .find_by_isbn_for_update(&mut connection, &isbn)
            .await?
            .ok_or_else(|| Report::new(KernelError::not_found(dto.isbn)))?;

        let details = Book::try_from(BookDto::from(dto))?;
        book.replace_details(details);

        let saved = self.book_modifier().upsert(&mut connection, &book).await?;
        connection.commit().await?;
        Ok(BookDto::from(saved))
    }

    async fn patch_book(&self, dto: PatchBookDto) -> error_stack::Result<BookDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        tracing::info!(isbn = dto.isbn, "Partially updating book");
        let isbn = BookIsbn::new(dto.isbn);
        let mut book = self
            .book_query()
            .find_by_isbn_for_update(&mut connection, &isbn)
            .await?
            .ok_or_else(|| Report::new(KernelError::not_found(dto.isbn)))?;

        let patches = dto
            .updates
            .iter()
            .map(|(field, value)| BookPatch::parse(field, value))
            .collect::<Result<Vec<BookPatch>, Report<KernelError>>>()?;
        for patch in patches {
            tracing::info!(isbn = dto.isbn, field = %patch.field(), "Updated field");
            book.apply(patch);
        }

        let saved = self.book_modifier().upsert(&mut connection, &book).await?;
        connection.commit().await?;
        Ok(BookDto::from(saved))
    }
}

impl<T> UpdateBookService for T where T: DependOnBookQuery + DependOnBookModifier {}

#[async_trait::async_trait]
pub trait DeleteBookService:
    'static + Sync + Send + DependOnBookQuery + DependOnBookModifier
{
    async fn delete_book(&self, dto: DeleteBookDto) -> error_stack::Result<(), KernelError> {
        let mut connection = self.database_connection().transact().await?;

        tracing::info!(isbn = dto.isbn, "Deleting book");
        let isbn = BookIsbn::new(dto.isbn);
        if !self
            .book_query()
            .exists_by_isbn(&mut connection, &isbn)
            .await?
        {
            return Err(Report::new(KernelError::not_found(dto.isbn)));
        }
        self.book_modifier().delete(&mut connection, &isbn).await?;
        connection.commit().await?;
        Ok(())
    }
}

impl<T> DeleteBookService for T where T: DependOnBookQuery + DependOnBookModifier {}

#[async_trait::async_trait]
pub trait PurchaseBookService:
    'static + Sync + Send + DependOnBookQuery + DependOnBookModifier
{
    async fn purchase_book(
        &self,
        dto: PurchaseBookDto,
    ) -> error_stack::Result<PurchaseDto, KernelError> {
        let mut connection = self.database_connection().transact().await?;

        let isbn = BookIsbn::new(dto.isbn);
        let mut book = self
            .book_query()
            .find_by_isbn_for_update(&mut connection, &isbn)
            .await?
            .ok_or_else(|| Report::new(KernelError::not_found(dto.isbn)))?;

        book.purchase(dto.quantity).map_err(|report| {
            if matches!(
                report.current_context(),
                KernelError::InsufficientStock { .. }
            ) {
                tracing::warn!(isbn = dto.isbn, "Purchase failed - Not enough stock");
            }
            report
        })?;

        let saved = self.book_modifier().upsert(&mut connection, &book).await?;
        connection.commit().await?;

        tracing::info!(
            isbn = dto.isbn,
            quantity = dto.quantity,
            "Purchased copies of book"
        );
        Ok(PurchaseDto {
            isbn: dto.isbn,
            purchased: dto.quantity,
            quantity_in_stock: *saved.quantity_in_stock().as_ref(),
        })
    }
}

impl<T> PurchaseBookService for T where T: DependOnBookQuery + DependOnBookModifier {}

#[cfg(test)]
mod test {
    use rust_decimal::Decimal;
    use serde_json::{json, Value};
    use time::macros::date;

    use driver::database::InMemoryDatabase;
    use kernel::KernelError;

    use crate::service::{
        DeleteBookService, GetBookService, PurchaseBookService, SaveBookService,
        UpdateBookService,
    };
    use crate::transfer::{
        BookDto, CheckStockDto, CreateBookDto, DeleteBookDto, GetBookDto, PatchBookDto,
        PurchaseBookDto, SearchBookDto, UpdateBookDto,
    };

    fn clean_code() -> CreateBookDto {
        CreateBookDto {
            title: "Clean Code".to_string(),
            author: "Robert C. Martin".to_string(),
            genre: Some("Programming".to_string()),
            price: Decimal::new(3299, 2),
            quantity_in_stock: 10,
            publication_date: Some(date!(2008 - 08 - 01)),
        }
    }

    fn refactoring() -> CreateBookDto {
        CreateBookDto {
            title: "Refactoring".to_string(),
            author: "Martin Fowler".to_string(),
            genre: None,
            price: Decimal::new(4500, 2),
            quantity_in_stock: 4,
            publication_date: None,
        }
    }

    async fn stored(db: &InMemoryDatabase, isbn: i32) -> BookDto {
        db.get_book(GetBookDto { isbn })
            .await
            .unwrap()
            .expect("book is stored")
    }

    fn patch(isbn: i32, updates: &[(&str, Value)]) -> PatchBookDto {
        PatchBookDto {
            isbn,
            updates: updates
                .iter()
                .map(|(field, value)| (field.to_string(), value.clone()))
                .collect(),
        }
    }

    #[tokio::test]
    async fn lookup_of_missing_isbn_is_absent() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        assert_eq!(db.get_book(GetBookDto { isbn: 404 }).await?, None);
        assert_eq!(db.get_book(GetBookDto { isbn: 0 }).await?, None);
        assert!(db.get_all_books().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn fetch_after_save_returns_same_fields() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let saved = db.create_book(clean_code()).await?;
        assert!(saved.isbn > 0);

        let expected = BookDto {
            isbn: saved.isbn,
            ..BookDto::from(clean_code())
        };
        assert_eq!(saved, expected);
        assert_eq!(stored(&db, saved.isbn).await, expected);
        Ok(())
    }

    #[tokio::test]
    async fn create_ignores_client_isbn_and_save_upserts() -> error_stack::Result<(), KernelError>
    {
        let db = InMemoryDatabase::new();
        let first = db.create_book(clean_code()).await?;
        let second = db.create_book(refactoring()).await?;
        assert_ne!(first.isbn, second.isbn);

        let replaced = db
            .save_book(BookDto {
                title: "Clean Code, 2nd Edition".to_string(),
                ..first.clone()
            })
            .await?;
        assert_eq!(replaced.isbn, first.isbn);
        assert_eq!(db.get_all_books().await?, vec![replaced, second]);
        Ok(())
    }

    #[tokio::test]
    async fn create_rejects_invalid_fields() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let err = db
            .create_book(CreateBookDto {
                title: " ".to_string(),
                ..clean_code()
            })
            .await
            .unwrap_err();
        assert_eq!(err.current_context(), &KernelError::validation("title"));

        let err = db
            .create_book(CreateBookDto {
                price: Decimal::new(-1, 0),
                ..clean_code()
            })
            .await
            .unwrap_err();
        assert_eq!(err.current_context(), &KernelError::validation("price"));

        assert!(db.get_all_books().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn search_is_case_insensitive() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let clean = db.create_book(clean_code()).await?;
        db.create_book(refactoring()).await?;

        let found = db
            .search_books(SearchBookDto {
                title: "clean".to_string(),
            })
            .await?;
        assert_eq!(found, vec![clean]);

        let found = db
            .search_books(SearchBookDto {
                title: "nothing like it".to_string(),
            })
            .await?;
        assert!(found.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn full_update_replaces_every_field() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let saved = db.create_book(clean_code()).await?;

        let updated = db
            .update_book(UpdateBookDto {
                isbn: saved.isbn,
                title: "Refactoring".to_string(),
                author: "Martin Fowler".to_string(),
                genre: None,
                price: Decimal::new(4500, 2),
                quantity_in_stock: 4,
                publication_date: None,
            })
            .await?;
        let expected = BookDto {
            isbn: saved.isbn,
            ..BookDto::from(refactoring())
        };
        assert_eq!(updated, expected);
        assert_eq!(stored(&db, saved.isbn).await, expected);

        let err = db
            .update_book(UpdateBookDto {
                isbn: 999,
                title: "Ghost".to_string(),
                author: "Nobody".to_string(),
                genre: None,
                price: Decimal::ZERO,
                quantity_in_stock: 0,
                publication_date: None,
            })
            .await
            .unwrap_err();
        assert_eq!(err.current_context(), &KernelError::not_found(999));
        assert_eq!(db.get_all_books().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn full_update_with_invalid_fields_changes_nothing(
    ) -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let saved = db.create_book(clean_code()).await?;
        let update = |title: &str, quantity_in_stock: i32| UpdateBookDto {
            isbn: saved.isbn,
            title: title.to_string(),
            author: "Martin Fowler".to_string(),
            genre: None,
            price: Decimal::new(4500, 2),
            quantity_in_stock,
            publication_date: None,
        };

        let err = db.update_book(update("  ", 4)).await.unwrap_err();
        assert_eq!(err.current_context(), &KernelError::validation("title"));
        assert_eq!(stored(&db, saved.isbn).await, saved);

        let err = db.update_book(update("Refactoring", -1)).await.unwrap_err();
        assert_eq!(
            err.current_context(),
            &KernelError::validation("quantityInStock")
        );
        assert_eq!(stored(&db, saved.isbn).await, saved);
        Ok(())
    }

    #[tokio::test]
    async fn patch_changes_only_given_fields() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let saved = db.create_book(clean_code()).await?;

        let patched = db
            .patch_book(patch(
                saved.isbn,
                &[("price", json!("19.99")), ("genre", Value::Null)],
            ))
            .await?;
        let expected = BookDto {
            price: Decimal::new(1999, 2),
            genre: None,
            ..saved
        };
        assert_eq!(patched, expected);
        assert_eq!(stored(&db, expected.isbn).await, expected);
        Ok(())
    }

    #[tokio::test]
    async fn patch_applies_entries_in_order() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let saved = db.create_book(clean_code()).await?;

        let patched = db
            .patch_book(patch(
                saved.isbn,
                &[
                    ("quantityInStock", json!(1)),
                    ("publicationDate", json!("2009-01-02")),
                    ("quantityInStock", json!(25)),
                ],
            ))
            .await?;
        assert_eq!(patched.quantity_in_stock, 25);
        assert_eq!(patched.publication_date, Some(date!(2009 - 01 - 02)));
        Ok(())
    }

    #[tokio::test]
    async fn patch_with_unknown_field_changes_nothing() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let saved = db.create_book(clean_code()).await?;

        let err = db
            .patch_book(patch(
                saved.isbn,
                &[("title", json!("Dirty Code")), ("bogus", json!("x"))],
            ))
            .await
            .unwrap_err();
        assert_eq!(err.current_context(), &KernelError::validation("bogus"));
        assert_eq!(stored(&db, saved.isbn).await, saved);

        let err = db
            .patch_book(patch(saved.isbn, &[("price", json!("free"))]))
            .await
            .unwrap_err();
        assert_eq!(err.current_context(), &KernelError::validation("price"));
        assert_eq!(stored(&db, saved.isbn).await, saved);

        let err = db
            .patch_book(patch(404, &[("bogus", json!("x"))]))
            .await
            .unwrap_err();
        assert_eq!(err.current_context(), &KernelError::not_found(404));
        Ok(())
    }

    #[tokio::test]
    async fn delete_missing_isbn_is_not_found() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let saved = db.create_book(clean_code()).await?;

        let err = db
            .delete_book(DeleteBookDto { isbn: 404 })
            .await
            .unwrap_err();
        assert_eq!(err.current_context(), &KernelError::not_found(404));
        assert_eq!(db.get_all_books().await?, vec![saved.clone()]);

        db.delete_book(DeleteBookDto { isbn: saved.isbn }).await?;
        assert_eq!(db.get_book(GetBookDto { isbn: saved.isbn }).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn stock_and_purchase_scenario() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let saved = db.create_book(clean_code()).await?;
        let isbn = saved.isbn;

        let purchase = db.purchase_book(PurchaseBookDto { isbn, quantity: 3 }).await?;
        assert_eq!(purchase.quantity_in_stock, 7);
        assert_eq!(
            stored(&db, isbn).await,
            BookDto {
                quantity_in_stock: 7,
                ..saved.clone()
            }
        );

        let err = db
            .purchase_book(PurchaseBookDto {
                isbn,
                quantity: 100,
            })
            .await
            .unwrap_err();
        assert_eq!(
            err.current_context(),
            &KernelError::InsufficientStock {
                isbn,
                requested: 100,
                available: 7,
            }
        );
        let stock = db.check_stock(CheckStockDto { isbn }).await?;
        assert_eq!(stock.quantity_in_stock, 7);

        let purchase = db.purchase_book(PurchaseBookDto { isbn, quantity: 7 }).await?;
        assert_eq!(purchase.quantity_in_stock, 0);

        let err = db
            .purchase_book(PurchaseBookDto { isbn: 404, quantity: 1 })
            .await
            .unwrap_err();
        assert_eq!(err.current_context(), &KernelError::not_found(404));
        let err = db
            .check_stock(CheckStockDto { isbn: 404 })
            .await
            .unwrap_err();
        assert_eq!(err.current_context(), &KernelError::not_found(404));
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_purchases_do_not_lose_updates() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let isbn = db.create_book(clean_code()).await?.isbn;

        let tasks = [3, 4].map(|quantity| {
            let db = db.clone();
            tokio::spawn(async move { db.purchase_book(PurchaseBookDto { isbn, quantity }).await })
        });
        for task in tasks {
            task.await.expect("purchase task panicked")?;
        }
        assert_eq!(db.check_stock(CheckStockDto { isbn }).await?.quantity_in_stock, 3);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_overselling_is_refused() -> error_stack::Result<(), KernelError> {
        let db = InMemoryDatabase::new();
        let isbn = db.create_book(clean_code()).await?.isbn;

        let tasks = [6, 6].map(|quantity| {
            let db = db.clone();
            tokio::spawn(async move { db.purchase_book(PurchaseBookDto { isbn, quantity }).await })
        });
        let mut refused = 0;
        for task in tasks {
            if let Err(report) = task.await.expect("purchase task panicked") {
                assert!(matches!(
                    report.current_context(),
                    KernelError::InsufficientStock { .. }
                ));
                refused += 1;
            }
        }
        assert_eq!(refused, 1);
        assert_eq!(db.check_stock(CheckStockDto { isbn }).await?.quantity_in_stock, 4);
        Ok(())
    }
}
