pub mod google;
pub mod provider;
pub mod tomtom;
