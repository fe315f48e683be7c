pub mod command;
pub mod value;
pub mod vocab;
