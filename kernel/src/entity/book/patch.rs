use std::fmt::{Display, Formatter};
use std::str::FromStr;

use error_stack::Report;
use serde_json::Value;

use crate::entity::{BookAuthor, BookGenre, BookPrice, BookStock, BookTitle, PublicationDate};
use crate::KernelError;

const TITLE: &str = "title";
const AUTHOR: &str = "author";
const GENRE: &str = "genre";
const PRICE: &str = "price";
const QUANTITY_IN_STOCK: &str = "quantityInStock";
const PUBLICATION_DATE: &str = "publicationDate";

/// The mutable fields of a [`Book`](crate::entity::Book), named as they appear on the wire.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum BookField {
    Title,
    Author,
    Genre,
    Price,
    QuantityInStock,
    PublicationDate,
}

impl BookField {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookField::Title => TITLE,
            BookField::Author => AUTHOR,
            BookField::Genre => GENRE,
            BookField::Price => PRICE,
            BookField::QuantityInStock => QUANTITY_IN_STOCK,
            BookField::PublicationDate => PUBLICATION_DATE,
        }
    }

    pub fn invalid(&self) -> KernelError {
        KernelError::validation(self.as_str())
    }
}

impl Display for BookField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookField {
    type Err = Report<KernelError>;
    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            TITLE => Ok(BookField::Title),
            AUTHOR => Ok(BookField::Author),
            GENRE => Ok(BookField::Genre),
            PRICE => Ok(BookField::Price),
            QUANTITY_IN_STOCK => Ok(BookField::QuantityInStock),
            PUBLICATION_DATE => Ok(BookField::PublicationDate),
            _ => Err(Report::new(KernelError::validation(name))
                .attach_printable(format!("`{name}` is not an updatable book field"))),
        }
    }
}

/// A single field assignment taken from a partial update payload.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum BookPatch {
    Title(BookTitle),
    Author(BookAuthor),
    Genre(Option<BookGenre>),
    Price(BookPrice),
    QuantityInStock(BookStock),
    PublicationDate(Option<PublicationDate>),
}

impl BookPatch {
    pub fn parse(name: &str, value: &Value) -> error_stack::Result<Self, KernelError> {
        let field = name.parse::<BookField>()?;
        let patch = match field {
            BookField::Title => Self::Title(BookTitle::try_new(text(field, value)?)?),
            BookField::Author => Self::Author(BookAuthor::try_new(text(field, value)?)?),
            BookField::Genre => Self::Genre(match value {
                Value::Null => None,
                value => Some(BookGenre::new(text(field, value)?)),
            }),
            BookField::Price => {
                let price = match value {
                    Value::Number(number) => number.to_string(),
                    Value::String(text) => text.clone(),
                    other => return Err(mismatch(field, "a decimal number", other)),
                };
                Self::Price(BookPrice::parse(&price)?)
            }
            BookField::QuantityInStock => {
                let stock = value
                    .as_i64()
                    .and_then(|stock| i32::try_from(stock).ok())
                    .ok_or_else(|| mismatch(field, "an integer", value))?;
                Self::QuantityInStock(BookStock::try_new(stock)?)
            }
            BookField::PublicationDate => Self::PublicationDate(match value {
                Value::Null => None,
                value => Some(PublicationDate::parse(text(field, value)?)?),
            }),
        };
        Ok(patch)
    }

    pub fn field(&self) -> BookField {
        match self {
            BookPatch::Title(_) => BookField::Title,
            BookPatch::Author(_) => BookField::Author,
            BookPatch::Genre(_) => BookField::Genre,
            BookPatch::Price(_) => BookField::Price,
            BookPatch::QuantityInStock(_) => BookField::QuantityInStock,
            BookPatch::PublicationDate(_) => BookField::PublicationDate,
        }
    }
}

fn text(field: BookField, value: &Value) -> error_stack::Result<&str, KernelError> {
    value.as_str().ok_or_else(|| mismatch(field, "a string", value))
}

fn mismatch(field: BookField, expected: &str, value: &Value) -> Report<KernelError> {
    Report::new(field.invalid()).attach_printable(format!("expected {expected}, got `{value}`"))
}
