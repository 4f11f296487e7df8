// Library exports for postdesk
// The binary and the integration tests both drive the manager through these modules

pub mod api;
pub mod comments;
pub mod config;
pub mod error;
pub mod highlight;
pub mod list;
pub mod models;
pub mod mutations;
pub mod query_state;
pub mod state;
pub mod view;
