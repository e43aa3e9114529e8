use error_stack::Report;
use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::entity::BookField;
use crate::KernelError;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct BookStock(i32);

impl BookStock {
    pub fn new(stock: impl Into<i32>) -> Self {
        Self(stock.into())
    }

    pub fn try_new(stock: impl Into<i32>) -> error_stack::Result<Self, KernelError> {
        let stock = stock.into();
        if stock < 0 {
            return Err(Report::new(BookField::QuantityInStock.invalid())
                .attach_printable(format!("quantityInStock must not be negative: {stock}")));
        }
        Ok(Self(stock))
    }

    /// Returns the remaining stock, or `None` when `quantity` exceeds what is on hand.
    pub fn withdraw(&self, quantity: i32) -> Option<Self> {
        if quantity > self.0 {
            return None;
        }
        Some(Self(self.0 - quantity))
    }
}
