use std::fmt::Display;

use error_stack::Context;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KernelError {
    NotFound {
        isbn: i32,
    },
    Validation {
        field: String,
    },
    InsufficientStock {
        isbn: i32,
        requested: i32,
        available: i32,
    },
    Concurrency,
    Timeout,
    Internal,
}

impl KernelError {
    pub fn not_found(isbn: impl Into<i32>) -> Self {
        KernelError::NotFound { isbn: isbn.into() }
    }

    pub fn validation(field: impl Into<String>) -> Self {
        KernelError::Validation {
            field: field.into(),
        }
    }
}

impl Display for KernelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelError::NotFound { isbn } => write!(f, "Book not found with ISBN: {isbn}"),
            KernelError::Validation { field } => write!(f, "Invalid field: {field}"),
            KernelError::InsufficientStock {
                isbn,
                requested,
                available,
            } => write!(
                f,
                "Insufficient stock for book with ISBN {isbn} (requested {requested}, available {available})"
            ),
            KernelError::Concurrency => write!(f, "Concurrency error"),
            KernelError::Timeout => write!(f, "Process timed out"),
            KernelError::Internal => write!(f, "Internal kernel error"),
        }
    }
}

impl Context for KernelError {}
