pub mod question_service;
pub mod register_service;
pub mod user_service;
pub mod variant_service;
