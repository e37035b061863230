//! Strategy - リクエストごとのキャッシュ方針
//!
//! # 判定順序
//! 1. GET 以外 → `Bypass`（一切介入しない）
//! 2. ナビゲーション → `NetworkFirst`（失敗時はオフラインページ）
//! 3. 同一オリジン → `CacheFirst`（ミス時はネットワーク + ランタイム補充）
//! 4. それ以外（クロスオリジン） → `NetworkOnly`（キャッシュしない）

use serde::{Deserialize, Serialize};
use url::Origin;

use super::request::Request;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Bypass,
    NetworkFirst,
    CacheFirst,
    NetworkOnly,
}

/// classify はスコープのオリジンに対してリクエストを分類する（副作用なし）
pub fn classify(request: &Request, scope: &Origin) -> Strategy {
    if !request.method().is_get() {
        return Strategy::Bypass;
    }
    if request.is_navigation() {
        return Strategy::NetworkFirst;
    }
    if request.url().origin() == *scope {
        return Strategy::CacheFirst;
    }
    Strategy::NetworkOnly
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::request::{Method, RequestMode};
    use rstest::rstest;
    use url::Url;

    fn scope() -> Origin {
        Url::parse("http://127.0.0.1:5000/").unwrap().origin()
    }

    #[rstest]
    #[case::same_origin_get(Method::Get, RequestMode::NoCors, "http://127.0.0.1:5000/static/app.css", Strategy::CacheFirst)]
    #[case::same_origin_cors_get(Method::Get, RequestMode::Cors, "http://127.0.0.1:5000/api/sea-temp", Strategy::CacheFirst)]
    #[case::navigation(Method::Get, RequestMode::Navigate, "http://127.0.0.1:5000/weather", Strategy::NetworkFirst)]
    #[case::cross_origin_navigation(Method::Get, RequestMode::Navigate, "https://example.org/", Strategy::NetworkFirst)]
    #[case::cross_origin_get(Method::Get, RequestMode::NoCors, "https://www.badatime.com/embed", Strategy::NetworkOnly)]
    #[case::other_port(Method::Get, RequestMode::NoCors, "http://127.0.0.1:8080/status", Strategy::NetworkOnly)]
    #[case::other_scheme(Method::Get, RequestMode::NoCors, "https://127.0.0.1:5000/status", Strategy::NetworkOnly)]
    #[case::post(Method::Post, RequestMode::SameOrigin, "http://127.0.0.1:5000/boats", Strategy::Bypass)]
    #[case::post_navigation(Method::Post, RequestMode::Navigate, "http://127.0.0.1:5000/boats", Strategy::Bypass)]
    #[case::head(Method::Head, RequestMode::NoCors, "http://127.0.0.1:5000/status", Strategy::Bypass)]
    #[case::cross_origin_delete(Method::Delete, RequestMode::Cors, "https://example.org/x", Strategy::Bypass)]
    fn classifies_requests(
        #[case] method: Method,
        #[case] mode: RequestMode,
        #[case] url: &str,
        #[case] expected: Strategy,
    ) {
        let request = Request::new(method, Url::parse(url).unwrap()).with_mode(mode);
        assert_eq!(classify(&request, &scope()), expected);
    }
}
