//! Client-side controllers for the wedding invitation page.

pub mod clipboard;
pub mod config;
pub mod gallery;
pub mod http_store;
pub mod lightbox;
pub mod likes;
pub mod rsvp;

#[cfg(test)]
mod tests;
