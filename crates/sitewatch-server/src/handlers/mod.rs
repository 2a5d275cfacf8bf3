pub mod options;
pub mod trigger;
