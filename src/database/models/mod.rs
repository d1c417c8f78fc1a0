pub mod offer;
pub mod user;

pub use offer::{Offer, OfferWithOwner};
pub use user::User;
