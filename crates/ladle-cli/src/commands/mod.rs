pub mod auth;
pub mod chef;
pub mod collection;
pub mod config;
pub mod recipe;
pub mod refresh;
pub mod social;
