use error_stack::Report;
use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::entity::BookField;
use crate::KernelError;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct BookAuthor(String);

impl BookAuthor {
    pub fn new(author: impl Into<String>) -> Self {
        Self(author.into())
    }

    pub fn try_new(author: impl Into<String>) -> error_stack::Result<Self, KernelError> {
        let author = author.into();
        if author.trim().is_empty() {
            return Err(Report::new(BookField::Author.invalid())
                .attach_printable("author must not be empty"));
        }
        Ok(Self(author))
    }
}
