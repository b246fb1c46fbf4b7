pub mod links;
pub mod usecase;
