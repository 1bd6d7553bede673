mod http;

pub(crate) use http::HttpUserDirectory;

use crate::error::{CostError, CostResult};

/// The external users directory.
///
/// `Ok(false)` is a definite "no such user". Anything that prevents a definite
/// answer (transport failure, timeout, bad status, bad payload) is
/// `CostError::UpstreamUnavailable`.
pub(crate) trait UserDirectory {
    fn exists(&self, owner_id: i64) -> CostResult<bool>;
}

/// Fail with `UserNotFound` unless the directory confirms `owner_id`.
pub(crate) fn ensure_exists<D: UserDirectory + ?Sized>(
    directory: &D,
    owner_id: i64,
) -> CostResult<()> {
    if directory.exists(owner_id)? {
        Ok(())
    } else {
        tracing::info!(owner_id, "users service reports no such user");
        Err(CostError::UserNotFound(owner_id))
    }
}
