//! Services separating I/O concerns from request dispatch

pub mod io;

pub use io::ImageIOService;
