use lazy_static::lazy_static;
use prometheus::{register_int_counter_vec, IntCounterVec};

lazy_static! {
    /// Blob store calls by operation (put, delete, presign) and result (success, error).
    pub static ref BLOB_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "blob_operations_total",
        "Blob storage operations segmented by operation and result",
        &["operation", "result"]
    )
    .expect("failed to register blob_operations_total");
}

pub fn record_blob_operation(operation: &str, success: bool) {
    let result = if success { "success" } else { "error" };
    BLOB_OPERATIONS_TOTAL
        .with_label_values(&[operation, result])
        .inc();
}
