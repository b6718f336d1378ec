//! OAuth token handling for Microsoft Graph.
//!
//! Interactive sign-in is out of scope; this module keeps a cached token
//! pair on disk and refreshes the access token when it nears expiry.

mod oauth;
pub mod tokens;

pub use oauth::TokenProvider;
pub use tokens::TokenCache;
