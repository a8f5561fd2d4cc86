//! Core validation trait

/// Trait for validating configuration structures
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}
