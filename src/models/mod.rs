pub mod credential;
pub mod email;
pub mod response;
pub mod submission;
