pub mod form_controller;
pub mod page;
pub mod session_store;
pub mod tone_controller;
pub mod tone_service;
