pub mod question;
pub mod testing;
pub mod user;
pub mod variant;
