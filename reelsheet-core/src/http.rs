use std::time::Duration;

use crate::error::{Error, Result};

pub const USER_AGENT: &str = concat!("reelsheet/", env!("CARGO_PKG_VERSION"));

/// Per-request timeout applied by every client in this crate.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(90);

/// Turn a non-2xx response into `Error::Api` carrying the response body.
pub fn check(resp: attohttpc::Response) -> Result<attohttpc::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let message = resp.text().unwrap_or_default();
    Err(Error::Api {
        status: status.as_u16(),
        message,
    })
}
