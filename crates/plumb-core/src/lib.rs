pub mod catalog;
pub mod classify;
pub mod config;
pub mod error;
pub mod io;
pub mod matcher;
pub mod normalize;
pub mod paths;
pub mod provider;
pub mod rules;
pub mod session;
pub mod translate;
pub mod tree;
pub mod types;

pub use error::{PlumbError, Result};
