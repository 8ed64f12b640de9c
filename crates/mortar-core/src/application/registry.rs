//! Block handler registry.
//!
//! Maps opening names to handlers and remembers every closing name any
//! registered handler accepts, so the engine can tell a stray `endfor` (an
//! unmatched end) from a name nobody knows (an unknown block).

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::application::ports::BlockHandler;
use crate::domain::DomainError;

#[derive(Default, Clone)]
pub struct BlockRegistry {
    handlers: BTreeMap<String, Arc<dyn BlockHandler>>,
    closing: BTreeSet<String>,
}

impl BlockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler under every name it declares.
    ///
    /// Fails without registering anything if the handler declares no names
    /// or one of its names is already taken.
    pub fn register(&mut self, handler: Arc<dyn BlockHandler>) -> Result<(), DomainError> {
        let names = handler.names();
        if names.is_empty() {
            return Err(DomainError::NamelessBlockHandler);
        }
        if let Some(taken) = names.iter().find(|n| self.handlers.contains_key(**n)) {
            return Err(DomainError::DuplicateBlockName {
                name: (*taken).to_owned(),
            });
        }

        for name in names {
            self.collect_closing_names(handler.as_ref(), name);
        }
        for name in names {
            self.handlers.insert((*name).to_owned(), Arc::clone(&handler));
        }
        Ok(())
    }

    /// Walk closing names transitively (`if` → `else` → `endif`).
    fn collect_closing_names(&mut self, handler: &dyn BlockHandler, name: &str) {
        let mut pending = vec![name.to_owned()];
        let mut seen = BTreeSet::new();
        while let Some(current) = pending.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            for closer in handler.closing_names(&current) {
                self.closing.insert((*closer).to_owned());
                pending.push((*closer).to_owned());
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn BlockHandler>> {
        self.handlers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Whether some registered handler accepts `name` as a closing marker.
    pub fn is_closing_name(&self, name: &str) -> bool {
        self.closing.contains(name)
    }

    /// Registered opening names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for BlockRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BlockRegistry")
            .field("names", &self.handlers.keys().collect::<Vec<_>>())
            .field("closing", &self.closing)
            .finish()
    }
}
