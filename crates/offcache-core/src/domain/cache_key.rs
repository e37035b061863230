//! CacheKey - バケット内のエントリを識別するキー
//!
//! # 正規化
//! - method + URL の組
//! - URL の fragment は落とす（`/weather#today` と `/weather` は同じキー）
//! - GET 以外のキーは書き込めず、照会しても必ずミスになる

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use super::request::{Method, Request};

/// CacheKey はメソッドとフラグメントを除いた URL の組
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    method: Method,
    url: Url,
}

impl CacheKey {
    pub fn new(method: Method, mut url: Url) -> Self {
        url.set_fragment(None);
        Self { method, url }
    }

    /// GET key for `url`.
    pub fn get(url: Url) -> Self {
        Self::new(Method::Get, url)
    }

    pub fn from_request(request: &Request) -> Self {
        Self::new(request.method().clone(), request.url().clone())
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Only GET entries may live in a bucket.
    pub fn is_storable(&self) -> bool {
        self.method.is_get()
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_is_ignored() {
        let a = CacheKey::get(Url::parse("http://localhost/weather#today").unwrap());
        let b = CacheKey::get(Url::parse("http://localhost/weather").unwrap());
        assert_eq!(a, b);
        assert_eq!(a.to_string(), "GET http://localhost/weather");
    }

    #[test]
    fn query_is_part_of_the_key() {
        let a = CacheKey::get(Url::parse("http://localhost/weather?city=busan").unwrap());
        let b = CacheKey::get(Url::parse("http://localhost/weather").unwrap());
        assert_ne!(a, b);
    }

    #[test]
    fn method_distinguishes_keys() {
        let url = Url::parse("http://localhost/status").unwrap();
        let get = CacheKey::get(url.clone());
        let post = CacheKey::new(Method::Post, url);
        assert_ne!(get, post);
        assert!(get.is_storable());
        assert!(!post.is_storable());
    }
}
