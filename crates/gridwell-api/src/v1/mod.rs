// API Version 1

pub mod dtos;

pub use dtos::*;
