//! Cross-module scenarios driven through the public surface

mod drag_scenarios;
mod reconcile_scenarios;
