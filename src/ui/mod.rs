pub mod format;
pub mod map;
pub mod pages;
pub mod panels;
pub mod tables;
