//! Authentication: Argon2 password hashing, JWT session cookies, and the
//! request extractor for the current user.

pub mod current_user;
pub mod password;
pub mod session;
