pub mod calendar_handlers;
pub mod like_handlers;
pub mod rsvp_handlers;
