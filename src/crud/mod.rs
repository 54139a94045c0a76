pub mod db;
pub mod flowers;
pub mod log;

pub use db::DB;
