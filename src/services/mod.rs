pub mod github_service;
pub mod post_service;
pub mod profile_service;
pub mod user_service;
