//! Structured log helpers.
//!
//! Every shipping log line carries the same core fields so that a transfer
//! can be followed across both nodes:
//! - `component`: emitting component (request, service, transport)
//! - `request_id`: numeric request id
//! - `origin`: origin marker ("local" or the peer address)

/// Log an event with a component field.
#[macro_export]
macro_rules! log_event {
    (info, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (error, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $component:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            component = $component,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a shipment event with the correlation fields.
#[macro_export]
macro_rules! log_shipment_event {
    ($level:ident, $component:expr, $msg:expr, $request_id:expr, $origin:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            request_id = $request_id,
            origin = %$origin,
            $($($field)*,)?
            $msg
        )
    };
}
