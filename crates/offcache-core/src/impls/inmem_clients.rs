//! InMemoryClients - 開いているページ数だけを持つ Clients 実装

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::ports::Clients;

#[derive(Debug, Default)]
pub struct InMemoryClients {
    open: AtomicUsize,
    controller: Mutex<Option<String>>,
}

impl InMemoryClients {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `n` open pages.
    pub fn with_open(n: usize) -> Self {
        Self {
            open: AtomicUsize::new(n),
            controller: Mutex::new(None),
        }
    }

    pub fn open_page(&self) {
        self.open.fetch_add(1, Ordering::SeqCst);
    }

    /// Current controller, if any page has been claimed.
    pub fn controller(&self) -> Option<String> {
        self.controller
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl Clients for InMemoryClients {
    async fn claim(&self, controller: &str) -> usize {
        *self
            .controller
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(controller.to_string());
        self.open.load(Ordering::SeqCst)
    }
}
