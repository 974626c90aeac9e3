pub mod auth;
pub mod request_id;

pub use auth::{auth_middleware, cookie_value, Authenticator, SecretAuthenticator, SECRET_COOKIE_NAME};
pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
