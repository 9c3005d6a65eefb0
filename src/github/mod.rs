pub mod installation;
pub mod jwt;
pub mod models;
