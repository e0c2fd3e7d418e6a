pub mod events;
pub mod notifications;
pub mod requests;
pub mod state;
