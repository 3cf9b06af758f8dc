pub mod request_id;

pub use request_id::{request_span, tag_request, RequestId};
