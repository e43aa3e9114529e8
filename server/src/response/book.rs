use crate::controller::Exhaust;
use application::transfer::{BookDto, PurchaseDto, StockDto};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;
use serde::Serialize;
use time::Date;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    isbn: i32,
    title: String,
    author: String,
    genre: Option<String>,
    price: Decimal,
    quantity_in_stock: i32,
    publication_date: Option<Date>,
}

impl From<BookDto> for BookResponse {
    fn from(value: BookDto) -> Self {
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

impl IntoResponse for BookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, axum::Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct CreatedBookResponse(BookResponse);

impl IntoResponse for CreatedBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, axum::Json(self.0)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedBookResponse {
    message: String,
}

impl DeletedBookResponse {
    pub fn new(isbn: i32) -> Self {
        Self {
            message: format!("Deleted book with ISBN {isbn}"),
        }
    }
}

impl IntoResponse for DeletedBookResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, axum::Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StockResponse {
    isbn: i32,
    quantity_in_stock: i32,
}

impl IntoResponse for StockResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, axum::Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    isbn: i32,
    purchased: i32,
    quantity_in_stock: i32,
}

impl IntoResponse for PurchaseResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, axum::Json(self)).into_response()
    }
}

pub struct BookPresenter;

impl Exhaust<()> for BookPresenter {
    type To = ();
    fn emit(&self, input: ()) -> Self::To {
        input
    }
}

impl Exhaust<BookDto> for BookPresenter {
    type To = BookResponse;
    fn emit(&self, input: BookDto) -> Self::To {
        BookResponse::from(input)
    }
}

impl Exhaust<Option<BookDto>> for BookPresenter {
    type To = Option<BookResponse>;
    fn emit(&self, input: Option<BookDto>) -> Self::To {
        input.map(BookResponse::from)
    }
}

impl Exhaust<Vec<BookDto>> for BookPresenter {
    type To = axum::Json<Vec<BookResponse>>;
    fn emit(&self, input: Vec<BookDto>) -> Self::To {
        let result = input
            .into_iter()
            .map(BookResponse::from)
            .collect::<Vec<_>>();

        axum::Json::from(result)
    }
}

impl Exhaust<StockDto> for BookPresenter {
    type To = StockResponse;
    fn emit(&self, input: StockDto) -> Self::To {
        StockResponse {
            isbn: input.isbn,
            quantity_in_stock: input.quantity_in_stock,
        }
    }
}

impl Exhaust<PurchaseDto> for BookPresenter {
    type To = PurchaseResponse;
    fn emit(&self, input: PurchaseDto) -> Self::To {
        PurchaseResponse {
            isbn: input.isbn,
            purchased: input.purchased,
            quantity_in_stock: input.quantity_in_stock,
        }
    }
}

pub struct CreatedBookPresenter;

impl Exhaust<BookDto> for CreatedBookPresenter {
    type To = CreatedBookResponse;
    fn emit(&self, input: BookDto) -> Self::To {
        CreatedBookResponse(BookResponse::from(input))
    }
}
