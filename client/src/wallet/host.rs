use std::{
    collections::HashMap,
    sync::Arc,
};

use super::InjectedWallet;

/// The page the client runs in: its origin and whatever globals wallet extensions injected.
pub trait HostPage: Send + Sync {
    fn origin(&self) -> &str;

    fn injected(&self, global_name: &str) -> Option<Arc<dyn InjectedWallet>>;
}

/// A host whose injected globals are fixed when it's built.
pub struct StaticHost {
    origin: String,
    globals: HashMap<String, Arc<dyn InjectedWallet>>,
}

impl StaticHost {
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            globals: HashMap::new(),
        }
    }

    pub fn with_global(mut self, name: impl Into<String>, wallet: Arc<dyn InjectedWallet>) -> Self {
        self.globals.insert(name.into(), wallet);
        self
    }
}

impl HostPage for StaticHost {
    fn origin(&self) -> &str {
        &self.origin
    }

    fn injected(&self, global_name: &str) -> Option<Arc<dyn InjectedWallet>> {
        self.globals.get(global_name).cloned()
    }
}
