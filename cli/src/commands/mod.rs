pub mod provision;
pub mod version;
