//! WorkerState - ゲートウェイのライフサイクル状態
//!
//! # 状態遷移
//! ```text
//! Parsed → Installing → Installed → Activating → Activated
//!              │                         │
//!              └──→ Redundant            └──→ Installed（削除失敗時は戻す）
//! ```
//!
//! - fetch を横取りできるのは `Activated` のときだけ
//! - `Redundant` は終端（install 失敗。旧バージョンが制御を保持し続ける）

use std::fmt;

use serde::{Deserialize, Serialize};

/// WorkerState はゲートウェイのライフサイクル状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    Parsed,
    Installing,
    Installed,
    Activating,
    Activated,
    Redundant,
}

impl WorkerState {
    pub fn can_intercept_fetch(&self) -> bool {
        matches!(self, WorkerState::Activated)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkerState::Redundant)
    }
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerState::Parsed => "parsed",
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
            WorkerState::Redundant => "redundant",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_activated_intercepts() {
        assert!(WorkerState::Activated.can_intercept_fetch());
        assert!(!WorkerState::Installed.can_intercept_fetch());
        assert!(!WorkerState::Activating.can_intercept_fetch());
        assert!(WorkerState::Redundant.is_terminal());
    }
}
