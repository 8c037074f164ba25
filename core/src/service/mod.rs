pub mod auth_service;
pub mod dto;
pub mod log_book;
