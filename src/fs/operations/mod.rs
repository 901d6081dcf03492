//! Filesystem operations split into focused modules.

mod browse;
mod dir_ops;
mod file_io;
mod quota;
mod resolve;
mod tree;

use log::debug;
use serde_json::Value;

use crate::error::FsError;
use crate::store::StoreError;

pub use dir_ops::Transfer;

/// Render a store call for error messages, e.g. `get_file(["a.txt",{"create":false}])`.
pub(crate) fn describe_call(op: &str, args: &Value) -> String {
    format!("{}({})", op, args)
}

/// Map a store error into an `FsError` annotated with the failing call.
pub(crate) fn annotate(op: &'static str, args: Value) -> impl FnOnce(StoreError) -> FsError {
    move |err| {
        let call = describe_call(op, &args);
        debug!("store call failed: {} ({})", call, err);
        FsError::from_store(err, call)
    }
}
