pub mod booking;
pub mod catalog;
pub mod movie;
pub mod report;
pub mod show;

pub use movie::Movie;
