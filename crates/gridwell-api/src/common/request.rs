// Request-scoped helpers.

use std::future::Future;
use std::time::Duration;

use gridwell_types::{DwellError, DwellResult};

use super::ApiError;

/// Run a service call under the request deadline. Expiry maps to
/// `ERR_TIMEOUT`; in-flight store writes may still complete but remain
/// invariant-preserving.
pub async fn with_deadline<T, F>(
    deadline: Duration,
    operation: &str,
    fut: F,
) -> Result<T, ApiError>
where
    F: Future<Output = DwellResult<T>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(ApiError::from(err)),
        Err(_) => Err(ApiError::from(DwellError::Timeout(operation.to_string()))),
    }
}
