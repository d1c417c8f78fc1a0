pub mod offer_service;
pub mod user_service;

pub use offer_service::{OfferFilters, OfferInput, OfferService};
pub use user_service::{UserInput, UserPage, UserService};
