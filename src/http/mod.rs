//! HTTP protocol layer module
//!
//! Response builders and request helpers shared by the forms server and the
//! template preview server.

pub mod request;
pub mod response;

pub use request::{client_ip, read_body_limited, user_agent, BodyError};
pub use response::{
    build_404_response, build_405_response, build_413_response, build_event_stream_response,
    build_html_response, build_json_response, build_options_response, full, ResponseBody,
};
