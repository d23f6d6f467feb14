pub mod event;
pub mod participant;
pub mod user;

pub use event::{Event, EventChanges, NewEvent};
pub use participant::Participant;
pub use user::{NewUser, User, UserView};
