use error_stack::{Report, ResultExt};
use kernel::KernelError;

/// Converts errors raised by the underlying store into a [`KernelError`] report.
pub(crate) trait ConvertError {
    type Ok;
    fn convert_error(self) -> error_stack::Result<Self::Ok, KernelError>;
}

impl<T> ConvertError for Result<T, sqlx::Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.map_err(|error| {
            let context = match &error {
                sqlx::Error::PoolTimedOut => KernelError::Timeout,
                // serialization_failure, deadlock_detected
                sqlx::Error::Database(db)
                    if matches!(db.code().as_deref(), Some("40001") | Some("40P01")) =>
                {
                    KernelError::Concurrency
                }
                _ => KernelError::Internal,
            };
            Report::from(error).change_context(context)
        })
    }
}

impl<T> ConvertError for Result<T, dotenvy::Error> {
    type Ok = T;
    fn convert_error(self) -> error_stack::Result<T, KernelError> {
        self.change_context_lazy(|| KernelError::Internal)
            .attach_printable("Failed to read environment variable")
    }
}
