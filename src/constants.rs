pub mod network {
    pub const TIMEOUT_API_REQUEST_MS: u64 = 30_000;
    pub const USER_AGENT: &str = concat!("commons-client/", env!("CARGO_PKG_VERSION"));
}

pub mod endpoints {
    pub const ACCESS_TOKEN_PATH: &str = "/user/credentials/api/access_token";
    pub const USER_INFO_PATH: &str = "/user/user";
    pub const DATA_DOWNLOAD_PATH: &str = "/user/data/download";
    pub const SUBMISSION_API_PREFIX: &str = "/api";
}

pub mod profiles {
    pub const DEFAULT_PROFILE: &str = "default";
    pub const CONFIG_DIR_NAME: &str = ".cdis";
    pub const CONFIG_FILE_NAME: &str = "config";
}

pub mod signing {
    pub const ALGORITHM: &str = "HMAC-SHA256";
    pub const KEY_PREFIX: &str = "CDIS";
    pub const REQUEST_TERMINATOR: &str = "cdis_request";
    pub const DATE_HEADER: &str = "x-cdis-date";
    pub const DEFAULT_SERVICE: &str = "user";
    pub const SUBMISSION_SERVICE: &str = "submission";
}

pub mod retry {
    /// First attempt plus one retry after a forced token refresh.
    pub const MAX_REQUEST_ATTEMPTS: u32 = 2;
}

pub mod limits {
    pub const BODY_SNIPPET_BYTES: usize = 512;
}

pub mod content_types {
    pub const JSON: &str = "application/json";
}
