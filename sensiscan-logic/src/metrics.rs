use lazy_static::lazy_static;
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};

lazy_static! {
    pub static ref OBJECTS_INGESTED: IntCounter = register_int_counter!(
        "sensiscan_objects_ingested_total",
        "total number of objects discovered and enqueued by the ingestor",
    )
    .unwrap();
    pub static ref MESSAGES_PROCESSED: IntCounter = register_int_counter!(
        "sensiscan_messages_processed_total",
        "total number of queue messages the worker has finished processing",
    )
    .unwrap();
    pub static ref MESSAGES_FAILED: IntCounter = register_int_counter!(
        "sensiscan_messages_failed_total",
        "total number of queue messages left unacknowledged after a fetch failure",
    )
    .unwrap();
    pub static ref FINDINGS_INSERTED: IntCounterVec = register_int_counter_vec!(
        "sensiscan_findings_inserted_total",
        "total number of finding rows inserted, by detector kind",
        &["detector"],
    )
    .unwrap();
    pub static ref FETCH_DURATION_SECONDS: Histogram = register_histogram!(
        "sensiscan_fetch_duration_seconds",
        "time spent fetching an object from the object store",
    )
    .unwrap();
    pub static ref SCAN_DURATION_SECONDS: Histogram = register_histogram!(
        "sensiscan_scan_duration_seconds",
        "time spent running the detector catalogue over one object's text",
    )
    .unwrap();
    pub static ref PERSIST_DURATION_SECONDS: Histogram = register_histogram!(
        "sensiscan_persist_duration_seconds",
        "time spent bulk-inserting findings for one object",
    )
    .unwrap();
}
