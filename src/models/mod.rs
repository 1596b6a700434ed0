// Models module - Database entity representations

pub mod booking;
pub mod court;
pub mod facility;
pub mod offer;
pub mod payment;
pub mod review;
pub mod time_slot;
pub mod user;

pub use booking::Booking;
pub use court::Court;
pub use facility::Facility;
pub use offer::Offer;
pub use payment::Payment;
pub use review::Review;
pub use time_slot::BlockedSlot;
pub use user::User;
