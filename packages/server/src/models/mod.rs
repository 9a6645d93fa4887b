pub mod auth;
pub mod building;
pub mod fountain;
pub mod review;
