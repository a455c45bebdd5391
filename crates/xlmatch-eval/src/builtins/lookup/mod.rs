pub mod core;
pub mod dynamic;

pub fn register_builtins() {
    use crate::function_registry::register;
    use std::sync::Arc;
    register(Arc::new(core::MatchFn));
    register(Arc::new(core::VLookupFn));
    register(Arc::new(core::HLookupFn));
    register(Arc::new(dynamic::XLookupFn));
}
