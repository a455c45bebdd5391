use once_cell::sync::OnceCell;

pub mod lookup;
pub mod math;

static LOADED: OnceCell<()> = OnceCell::new();

/// Register every builtin with the global registry. Only the first call
/// does any work.
pub fn load_builtins() {
    LOADED.get_or_init(|| {
        lookup::register_builtins();
        math::register_builtins();
    });
}
