pub mod add;
pub mod check;
pub mod drill;
pub mod reset;
