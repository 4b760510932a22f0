pub mod comment;
pub mod location_user;
pub mod movie;
pub mod rating;
pub mod user;
pub mod user_profile;
