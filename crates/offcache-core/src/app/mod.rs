//! App - アプリケーション層
//!
//! ports を組み合わせてゲートウェイのロジックを実装する。
//!
//! # 主要コンポーネント
//! - **GatewayBuilder**: 設定の検証とワイヤリング
//! - **Gateway**: install / activate / fetch 横取り
//! - **PageHost**: 横取りされなかったリクエストをページ側から送る
//! - **GatewayStats**: 横取り結果の集計

pub mod builder;
pub mod gateway;
pub mod host;
pub mod status;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, GatewayBuilder};
pub use self::gateway::{ActivateReport, FetchOutcome, Gateway, InstallReport, ResponseSource};
pub use self::host::{DispatchSource, Dispatched, PageHost};
pub use self::status::{GatewayStats, StatsSnapshot};
