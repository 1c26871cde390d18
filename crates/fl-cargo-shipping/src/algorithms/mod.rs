//! # Algorithms Module
//!
//! Request id sequencing, manifest translation, and the request/reply exchange.

pub mod exchange;
pub mod manifest;
pub mod sequence;

pub use exchange::{
    evaluate_reply, CallPayload, RemoteReply, TransportClient, CALL_INITIATE_TRANSFER,
    CALL_TRANSFER_REPLY, DEFAULT_APPROVER, STATUS_OK,
};
pub use manifest::{apply_allow_list, translate_items, Translation};
pub use sequence::{last_request_id, next_request_id};
