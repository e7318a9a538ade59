pub mod access;
pub mod issues;
pub mod submit;
