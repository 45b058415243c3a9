//! [SolisCloud](https://www.soliscloud.com) monitoring API client.
//!
//! Requests are signed with the vendor HMAC-SHA1 scheme, and the historical station queries
//! (all-time, yearly and monthly) are memoized per query for the lifetime of the client.

pub mod api;
pub mod prelude;
