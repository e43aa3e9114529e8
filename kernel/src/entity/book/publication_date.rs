use error_stack::ResultExt;
use serde::{Deserialize, Serialize};
use time::macros::format_description;
use time::Date;
use vodca::{AsRefln, Fromln};

use crate::entity::BookField;
use crate::KernelError;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct PublicationDate(Date);

impl PublicationDate {
    pub fn new(date: impl Into<Date>) -> Self {
        Self(date.into())
    }

    pub fn parse(text: &str) -> error_stack::Result<Self, KernelError> {
        let date = Date::parse(text, format_description!("[year]-[month]-[day]"))
            .change_context_lazy(|| BookField::PublicationDate.invalid())
            .attach_printable_lazy(|| format!("`{text}` is not an ISO date (YYYY-MM-DD)"))?;
        Ok(Self(date))
    }
}
