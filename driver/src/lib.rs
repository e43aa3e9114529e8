use kernel::KernelError;

use crate::error::ConvertError;

pub mod database;
mod error;

pub(crate) fn env(key: &str) -> error_stack::Result<String, KernelError> {
    dotenvy::var(key).convert_error()
}
