pub mod context_steps;
pub mod guard_steps;
