//! Declarative implication rules
//!
//! Inter-option dependencies ("a shared build has no fPIC", "a minimal
//! build disables these modules") are data, not control flow: each is a
//! [`Rule`] in a [`RuleTable`] evaluated by a small generic engine.

mod condition;
mod rule;
mod table;

pub use condition::Condition;
pub use rule::Rule;
pub use table::RuleTable;
