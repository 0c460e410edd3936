mod access;
mod credential;
mod http;

pub use access::{AccessGrantMap, PermissionSet};
pub use credential::Credential;
pub use http::{HttpRequest, HttpResponse, RequestSpec};
