pub mod field;
pub mod item;
pub mod value;
pub mod view;
