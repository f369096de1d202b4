pub mod balance;
pub mod department;
pub mod leave;
pub mod user;
