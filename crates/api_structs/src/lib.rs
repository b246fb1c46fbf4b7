mod appointment;
mod availability;
mod request;
mod status;

pub mod dtos {
    pub use crate::appointment::dtos::*;
    pub use crate::availability::dtos::*;
}

pub use crate::appointment::api::*;
pub use crate::availability::api::*;
pub use crate::request::api::*;
pub use crate::status::api::*;
