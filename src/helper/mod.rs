pub mod form_helpers;
pub mod public_helpers;
pub mod upload_helpers;
pub mod validation_helpers;
