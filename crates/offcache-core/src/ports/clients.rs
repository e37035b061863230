//! Clients port - ゲートウェイが制御するページの集合
//!
//! activate 完了時に `claim` し、リロードなしで開いているページを制御下に置く。

use async_trait::async_trait;

/// Clients はゲートウェイの配下にある開いたページの集合
#[async_trait]
pub trait Clients: Send + Sync {
    /// Make `controller` the controller of every open page.
    /// Returns how many pages were claimed.
    async fn claim(&self, controller: &str) -> usize;
}
