//! Library crate for bid-bazaar-back: the live auction controller behind the
//! admin console, the public display and the team screens.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
