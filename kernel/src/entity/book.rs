mod author;
mod genre;
mod isbn;
mod patch;
mod price;
mod publication_date;
mod stock;
mod title;

pub use self::{
    author::*, genre::*, isbn::*, patch::*, price::*, publication_date::*, stock::*, title::*,
};
use crate::KernelError;
use destructure::{Destructure, Mutation};
use error_stack::Report;
use vodca::References;

#[derive(Debug, Clone, Eq, PartialEq, References, Destructure, Mutation)]
pub struct Book {
    isbn: BookIsbn,
    title: BookTitle,
    author: BookAuthor,
    genre: Option<BookGenre>,
    price: BookPrice,
    quantity_in_stock: BookStock,
    publication_date: Option<PublicationDate>,
}

impl Book {
    pub fn new(
        isbn: BookIsbn,
        title: BookTitle,
        author: BookAuthor,
        genre: Option<BookGenre>,
        price: BookPrice,
        quantity_in_stock: BookStock,
        publication_date: Option<PublicationDate>,
    ) -> Self {
        Self {
            isbn,
            title,
            author,
            genre,
            price,
            quantity_in_stock,
            publication_date,
        }
    }

    /// Overwrites every mutable field with the ones from `details`. The identity is kept.
    pub fn replace_details(&mut self, details: Book) {
        let DestructBook {
            title,
            author,
            genre,
            price,
            quantity_in_stock,
            publication_date,
            ..
        } = details.into_destruct();
        self.substitute(|book| {
            *book.title = title;
            *book.author = author;
            *book.genre = genre;
            *book.price = price;
            *book.quantity_in_stock = quantity_in_stock;
            *book.publication_date = publication_date;
        });
    }

    pub fn apply(&mut self, patch: BookPatch) {
        self.substitute(|book| match patch {
            BookPatch::Title(title) => *book.title = title,
            BookPatch::Author(author) => *book.author = author,
            BookPatch::Genre(genre) => *book.genre = genre,
            BookPatch::Price(price) => *book.price = price,
            BookPatch::QuantityInStock(stock) => *book.quantity_in_stock = stock,
            BookPatch::PublicationDate(date) => *book.publication_date = date,
        });
    }

    /// Takes `quantity` copies out of stock. Nothing changes when the purchase is refused.
    pub fn purchase(&mut self, quantity: i32) -> error_stack::Result<(), KernelError> {
        if quantity <= 0 {
            return Err(Report::new(KernelError::validation("quantity"))
                .attach_printable(format!("quantity must be positive: {quantity}")));
        }
        let available = *self.quantity_in_stock.as_ref();
        let remaining = self.quantity_in_stock.withdraw(quantity).ok_or_else(|| {
            Report::new(KernelError::InsufficientStock {
                isbn: *self.isbn.as_ref(),
                requested: quantity,
                available,
            })
        })?;
        self.substitute(|book| *book.quantity_in_stock = remaining);
        Ok(())
    }
}
