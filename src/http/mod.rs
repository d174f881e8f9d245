pub(crate) mod request;
pub(crate) mod response;

pub use request::{Body, Method, Request};
pub(crate) use request::parse_urlencoded;
pub use response::{reason_phrase, ResponseWriter};
