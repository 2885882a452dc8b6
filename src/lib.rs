pub mod app;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod export;
pub mod filter;
pub mod pager;
pub mod record;
pub mod session;
pub mod store;
pub mod view;

#[cfg(test)]
mod tests;
