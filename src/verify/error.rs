use thiserror::Error;

use crate::disposable::DisposableError;
use crate::mx::Error as MxError;

/// Errors raised while assembling a [`Verifier`](crate::verify::Verifier).
/// Verification itself never fails.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Resolver(#[from] MxError),
    #[error(transparent)]
    Disposable(#[from] DisposableError),
}
