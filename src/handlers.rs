pub mod admin;
pub mod auth;
pub mod cash_register;
pub mod health;
pub mod incomes;
pub mod orders;
pub mod recipes;
pub mod reports;
pub mod supplies;
