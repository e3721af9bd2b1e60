pub mod admin;
pub mod assess;
pub mod hub;
pub mod session;
