pub mod banner;
pub mod config;
pub mod consts;
pub mod retriever;
pub mod service;
pub mod session;
pub mod spinner;
