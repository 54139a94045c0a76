pub mod fields;
pub mod theme;

pub use fields::FieldSet;
pub use theme::Theme;
