mod password;

pub use password::{hash_password, verify_against_decoy, verify_password};
