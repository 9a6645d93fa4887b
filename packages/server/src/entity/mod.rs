pub mod building;
pub mod fountain;
pub mod like;
pub mod review;
pub mod user;
