//! Tibber GraphQL API client and response classification.

pub mod classifier;
pub mod client;
pub mod errors;
pub mod extract;
pub mod json;
pub mod policy;
pub mod source;

pub use classifier::{Payload, ResponseClassifier};
pub use client::TibberClient;
pub use errors::{ClientError, PolicyError, TibberApiError};
pub use extract::{ErrorEntry, extract_error_details};
pub use policy::{StatusClass, StatusPolicy, StatusPolicyConfig};
pub use source::{RawResponse, ResponseSource};

/// Extension code used when a response carries none.
pub const UNKNOWN_CODE: &str = "UNKNOWN";

/// Code assigned on fatal statuses that the policy marks as unauthorized.
pub const UNAUTHORIZED_CODE: &str = "UNAUTHORIZED";

/// Extension code for missing or invalid tokens on HTTP 200 responses.
pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";

/// Extension code that, together with [`DEMO_USER_MARKER`], flags demo-account restrictions.
pub const INTERNAL_SERVER_ERROR: &str = "INTERNAL_SERVER_ERROR";

pub const DEMO_USER_MARKER: &str = "demo user";

pub const JSON_CONTENT_TYPE: &str = "application/json";
