pub mod email;
pub mod google;
