pub mod codec;
pub mod command;
pub mod fingerprint;
pub mod models;
pub mod plan;
pub mod probe;
pub mod registry;
pub mod source;
pub mod validation;
