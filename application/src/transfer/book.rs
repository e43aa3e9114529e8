use error_stack::Report;
use rust_decimal::Decimal;
use serde_json::Value;
use time::Date;

use kernel::prelude::entity::{
    Book, BookAuthor, BookGenre, BookIsbn, BookPrice, BookStock, BookTitle, DestructBook,
    PublicationDate,
};
use kernel::KernelError;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct BookDto {
    pub isbn: i32,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub price: Decimal,
    pub quantity_in_stock: i32,
    pub publication_date: Option<Date>,
}

impl From<Book> for BookDto {
    fn from(value: Book) -> Self {
        let DestructBook {
            isbn,
            title,
            author,
            genre,
            price,
            quantity_in_stock,
            publication_date,
        } = value.into_destruct();
        Self {
            isbn: isbn.into(),
            title: title.into(),
            author: author.into(),
            genre: genre.map(String::from),
            price: price.into(),
            quantity_in_stock: quantity_in_stock.into(),
            publication_date: publication_date.map(Date::from),
        }
    }
}

impl TryFrom<BookDto> for Book {
    type Error = Report<KernelError>;
    fn try_from(value: BookDto) -> Result<Self, Self::Error> {
        Ok(Book::new(
            BookIsbn::new(value.isbn),
            BookTitle::try_new(value.title)?,
            BookAuthor::try_new(value.author)?,
            value.genre.map(BookGenre::new),
            BookPrice::try_new(value.price)?,
            BookStock::try_new(value.quantity_in_stock)?,
            value.publication_date.map(PublicationDate::new),
        ))
    }
}

pub struct GetBookDto {
    pub isbn: i32,
}

pub struct SearchBookDto {
    pub title: String,
}

pub struct CreateBookDto {
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub price: Decimal,
    pub quantity_in_stock: i32,
    pub publication_date: Option<Date>,
}

// Any isbn the client sent is dropped here so the store issues a new one.
impl From<CreateBookDto> for BookDto {
    fn from(value: CreateBookDto) -> Self {
        Self {
            isbn: *BookIsbn::Unassigned.as_ref(),
            title: value.title,
            author: value.author,
            genre: value.genre,
            price: value.price,
            quantity_in_stock: value.quantity_in_stock,
            publication_date: value.publication_date,
        }
    }
}

pub struct UpdateBookDto {
    pub isbn: i32,
    pub title: String,
    pub author: String,
    pub genre: Option<String>,
    pub price: Decimal,
    pub quantity_in_stock: i32,
    pub publication_date: Option<Date>,
}

impl From<UpdateBookDto> for BookDto {
    fn from(value: UpdateBookDto) -> Self {
        Self {
            isbn: value.isbn,
            title: value.title,
            author: value.author,
            genre: value.genre,
            price: value.price,
            quantity_in_stock: value.quantity_in_stock,
            publication_date: value.publication_date,
        }
    }
}

pub struct PatchBookDto {
    pub isbn: i32,
    /// Field name and raw value pairs, applied in this order.
    pub updates: Vec<(String, Value)>,
}

pub struct DeleteBookDto {
    pub isbn: i32,
}

pub struct CheckStockDto {
    pub isbn: i32,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct StockDto {
    pub isbn: i32,
    pub quantity_in_stock: i32,
}

pub struct PurchaseBookDto {
    pub isbn: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct PurchaseDto {
    pub isbn: i32,
    pub purchased: i32,
    pub quantity_in_stock: i32,
}
