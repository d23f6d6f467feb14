pub mod credential_service;
pub mod event_service;
pub mod participant_service;

pub use credential_service::CredentialService;
pub use event_service::EventService;
pub use participant_service::ParticipantService;
