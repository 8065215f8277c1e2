pub mod accounts;
pub mod export;
pub mod health;
pub mod incidents;
pub mod media;
pub mod statistics;
