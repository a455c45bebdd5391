pub mod criteria_aggregates;

pub fn register_builtins() {
    criteria_aggregates::register_builtins();
}
