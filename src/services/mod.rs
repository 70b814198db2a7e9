// src/services/mod.rs
//
// Services Module - Orchestration Layer

pub mod form_service;
pub mod master_data_service;
pub mod reference_validator;

pub use form_service::FormService;
pub use master_data_service::MasterDataService;
pub use reference_validator::ReferenceValidator;
