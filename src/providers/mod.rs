pub mod bundled;
pub mod eurostat;
pub mod frankfurter;
pub mod fred;
