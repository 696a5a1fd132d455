mod events;
mod health;

pub use events::receive_event;
pub use health::health_check;
