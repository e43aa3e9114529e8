use std::str::FromStr;

use error_stack::{Report, ResultExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::entity::BookField;
use crate::KernelError;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct BookPrice(Decimal);

impl BookPrice {
    pub fn new(price: impl Into<Decimal>) -> Self {
        Self(price.into())
    }

    pub fn try_new(price: impl Into<Decimal>) -> error_stack::Result<Self, KernelError> {
        let price = price.into();
        if price < Decimal::ZERO {
            return Err(Report::new(BookField::Price.invalid())
                .attach_printable(format!("price must not be negative: {price}")));
        }
        Ok(Self(price))
    }

    pub fn parse(text: &str) -> error_stack::Result<Self, KernelError> {
        let price = Decimal::from_str(text.trim())
            .or_else(|_| Decimal::from_scientific(text.trim()))
            .change_context_lazy(|| BookField::Price.invalid())
            .attach_printable_lazy(|| format!("`{text}` is not a decimal value"))?;
        Self::try_new(price)
    }
}

#[cfg(test)]
mod test {
    use rust_decimal::Decimal;

    use super::BookPrice;
    use crate::KernelError;

    #[test]
    fn parse_decimal_text() {
        let price = BookPrice::parse("19.99").unwrap();
        assert_eq!(price, BookPrice::new(Decimal::new(1999, 2)));
        assert_eq!(
            BookPrice::parse("0").unwrap(),
            BookPrice::new(Decimal::ZERO)
        );
    }

    #[test]
    fn reject_garbage_and_negative() {
        let err = BookPrice::parse("cheap").unwrap_err();
        assert_eq!(err.current_context(), &KernelError::validation("price"));
        let err = BookPrice::parse("-1.50").unwrap_err();
        assert_eq!(err.current_context(), &KernelError::validation("price"));
    }
}
