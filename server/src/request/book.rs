use crate::controller::Intake;
use application::transfer::{
    CheckStockDto, CreateBookDto, DeleteBookDto, GetBookDto, PatchBookDto, PurchaseBookDto,
    SearchBookDto, UpdateBookDto,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Map, Value};
use time::Date;

// The body of POST /books and PUT /books/:isbn. An `isbn` key in the body is ignored.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookRequest {
    title: String,
    author: String,
    genre: Option<String>,
    price: Decimal,
    quantity_in_stock: i32,
    publication_date: Option<Date>,
}

#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct PatchBookRequest(Map<String, Value>);

#[derive(Debug, Deserialize)]
pub struct SearchBookRequest {
    title: String,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseBookRequest {
    quantity: i32,
}

#[derive(Debug)]
pub struct GetBookRequest {
    isbn: i32,
}

impl GetBookRequest {
    pub fn new(isbn: i32) -> Self {
        Self { isbn }
    }
}

#[derive(Debug)]
pub struct DeleteBookRequest {
    isbn: i32,
}

impl DeleteBookRequest {
    pub fn new(isbn: i32) -> Self {
        Self { isbn }
    }
}

#[derive(Debug)]
pub struct StockRequest {
    isbn: i32,
}

impl StockRequest {
    pub fn new(isbn: i32) -> Self {
        Self { isbn }
    }
}

pub struct BookTransformer;

impl Intake<BookRequest> for BookTransformer {
    type To = CreateBookDto;
    fn emit(&self, input: BookRequest) -> Self::To {
        CreateBookDto {
            title: input.title,
            author: input.author,
            genre: input.genre,
            price: input.price,
            quantity_in_stock: input.quantity_in_stock,
            publication_date: input.publication_date,
        }
    }
}

impl Intake<(i32, BookRequest)> for BookTransformer {
    type To = UpdateBookDto;
    fn emit(&self, input: (i32, BookRequest)) -> Self::To {
        let (isbn, input) = input;
        UpdateBookDto {
            isbn,
            title: input.title,
            author: input.author,
            genre: input.genre,
            price: input.price,
            quantity_in_stock: input.quantity_in_stock,
            publication_date: input.publication_date,
        }
    }
}

impl Intake<(i32, PatchBookRequest)> for BookTransformer {
    type To = PatchBookDto;
    fn emit(&self, input: (i32, PatchBookRequest)) -> Self::To {
        let (isbn, PatchBookRequest(updates)) = input;
        PatchBookDto {
            isbn,
            updates: updates.into_iter().collect(),
        }
    }
}

impl Intake<GetBookRequest> for BookTransformer {
    type To = GetBookDto;
    fn emit(&self, input: GetBookRequest) -> Self::To {
        GetBookDto { isbn: input.isbn }
    }
}

impl Intake<SearchBookRequest> for BookTransformer {
    type To = SearchBookDto;
    fn emit(&self, input: SearchBookRequest) -> Self::To {
        SearchBookDto { title: input.title }
    }
}

impl Intake<DeleteBookRequest> for BookTransformer {
    type To = DeleteBookDto;
    fn emit(&self, input: DeleteBookRequest) -> Self::To {
        DeleteBookDto { isbn: input.isbn }
    }
}

impl Intake<StockRequest> for BookTransformer {
    type To = CheckStockDto;
    fn emit(&self, input: StockRequest) -> Self::To {
        CheckStockDto { isbn: input.isbn }
    }
}

impl Intake<(i32, PurchaseBookRequest)> for BookTransformer {
    type To = PurchaseBookDto;
    fn emit(&self, input: (i32, PurchaseBookRequest)) -> Self::To {
        let (isbn, input) = input;
        PurchaseBookDto {
            isbn,
            quantity: input.quantity,
        }
    }
}
