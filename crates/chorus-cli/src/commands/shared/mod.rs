pub mod parse;
pub mod window;
