use error_stack::Report;
use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln};

use crate::entity::BookField;
use crate::KernelError;

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize, Fromln, AsRefln)]
pub struct BookTitle(String);

impl BookTitle {
    pub fn new(title: impl Into<String>) -> Self {
        Self(title.into())
    }

    pub fn try_new(title: impl Into<String>) -> error_stack::Result<Self, KernelError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(Report::new(BookField::Title.invalid())
                .attach_printable("title must not be empty"));
        }
        Ok(Self(title))
    }
}
