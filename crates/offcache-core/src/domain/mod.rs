//! Domain model (requests, responses, cache keys, bucket names, strategies, ...).
//!
//! ここにある型は ports / impls / app のどれにも依存しない。

pub mod bucket;
pub mod cache_key;
pub mod errors;
pub mod manifest;
pub mod request;
pub mod response;
pub mod state;
pub mod strategy;

pub use bucket::{BucketName, BucketRole, BucketSet};
pub use cache_key::CacheKey;
pub use errors::{CacheError, FetchError, GatewayError, InstallFailure};
pub use manifest::{DEFAULT_MANIFEST, DEFAULT_OFFLINE_PAGE, PrecacheManifest};
pub use request::{Headers, Method, Request, RequestMode};
pub use response::{CachedResponse, Response, ResponseType};
pub use state::WorkerState;
pub use strategy::{Strategy, classify};
