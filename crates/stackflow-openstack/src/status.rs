//! Platform status strings and the errors raised from them

use stackflow_cloud::CloudError;
use std::future::{Ready, ready};

pub const IMAGE_ACTIVE: &str = "active";
pub const IMAGE_KILLED: &str = "killed";
pub const IMAGE_ACTIVE_TIMEOUT: u64 = 600;

pub const VM_ACTIVE: &str = "ACTIVE";
pub const VM_ERROR: &str = "ERROR";
pub const VM_DELETED: &str = "DELETED";

pub const VOLUME_AVAILABLE: &str = "available";
pub const VOLUME_ERROR: &str = "error";
pub const VOLUME_DELETED: &str = "deleted";
pub const VOLUME_TIMEOUT: u64 = 300;

pub const STACK_CREATE_COMPLETE: &str = "CREATE_COMPLETE";
pub const STACK_CREATE_FAILED: &str = "CREATE_FAILED";
pub const STACK_DELETE_COMPLETE: &str = "DELETE_COMPLETE";
pub const STACK_DELETE_FAILED: &str = "DELETE_FAILED";
pub const STACK_DELETE_TIMEOUT: u64 = 1200;

/// Failure hook for [`StatusPoller::wait_for`](stackflow_cloud::StatusPoller::wait_for)
/// on kinds without child diagnostics.
pub(crate) fn creation_failed(
    kind: &'static str,
    name: &str,
) -> impl FnOnce(String) -> Ready<CloudError> {
    let name = name.to_string();
    move |status| {
        ready(CloudError::CreationFailed {
            kind,
            name,
            status,
            children: Vec::new(),
        })
    }
}

/// Failure hook for deletion waits; the status is the terminal one reported.
pub(crate) fn delete_failed(
    kind: &'static str,
    name: &str,
) -> impl FnOnce(String) -> Ready<CloudError> {
    let name = name.to_string();
    move |status| {
        ready(CloudError::Cleanup(format!(
            "{} {} deletion failed with status {}",
            kind, name, status
        )))
    }
}

pub(crate) fn creation_timeout(kind: &'static str, name: &str, status: String) -> CloudError {
    CloudError::CreationTimeout {
        kind,
        name: name.to_string(),
        status,
    }
}

pub(crate) fn never<S>(_: &S) -> bool {
    false
}
