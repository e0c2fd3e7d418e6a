pub mod form;
pub mod popup;
pub mod searchbar;
pub mod selector;
pub mod statusbar;
pub mod tree;

pub use selector::{SearchableSelector, SelectorOutcome};
pub use tree::TreeView;
