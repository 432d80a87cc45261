pub mod backend;
pub mod dispatcher;
pub mod error;
pub mod framer;
pub mod http_backend;
pub mod lifecycle;
pub mod message_parser;
pub mod types;
