pub mod assign;

pub use assign::AssignDialog;
