pub mod auth_dto;
pub mod question_dto;
pub mod response;
pub mod variant_dto;
