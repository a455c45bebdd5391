use crate::function::Function;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;

// Keyed by upper-case name.
static REG: Lazy<DashMap<String, Arc<dyn Function>>> = Lazy::new(DashMap::new);

pub fn register(f: Arc<dyn Function>) {
    REG.insert(f.name().to_ascii_uppercase(), f);
}

/// Case-insensitive lookup.
pub fn get(name: &str) -> Option<Arc<dyn Function>> {
    REG.get(&name.to_ascii_uppercase())
        .map(|v| Arc::clone(v.value()))
}

pub fn registered_names() -> Vec<String> {
    let mut names: Vec<String> = REG.iter().map(|e| e.key().clone()).collect();
    names.sort();
    names
}
