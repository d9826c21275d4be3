//! API Module - Serializable views for the host UI

pub mod engine_status;
