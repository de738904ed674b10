//! Synchronous adapter from a flat operation set to the Weibo REST API.
//!
//! # Overview
//! Each operation builds one correctly encoded request (GET with a query
//! string, form POST, or multipart POST carrying a picture), executes it once,
//! and collapses transport failures, embedded `error_code` bodies and HTTP
//! status codes into a single `Result<String, WeiboError>`. Successful
//! bodies are returned as opaque JSON text.
//!
//! # Design
//! - `WeiboClient` is stateless and only builds `HttpRequest` values.
//! - `Dispatcher` is the one seam that performs network I/O.
//! - `normalize::parse_response` owns error precedence.
//! - `WeiboSender` wires the pipeline together per operation.

pub mod attachment;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod http;
pub mod multipart;
pub mod normalize;
pub mod params;
pub mod sender;
pub mod types;

pub use attachment::{Attachment, AttachmentSource};
pub use client::WeiboClient;
pub use config::{Config, Endpoints};
pub use dispatch::{Dispatcher, UreqDispatcher};
pub use error::WeiboError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use params::{ParamValue, Params};
pub use sender::WeiboSender;
pub use types::{TimelineQuery, Visibility, WeiboStatus};
