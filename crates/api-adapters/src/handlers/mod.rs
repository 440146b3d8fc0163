pub mod action;
pub mod analysis;
pub mod auth;
pub mod collision;
pub mod market;
pub mod resources;
pub mod system;
pub mod topic;
