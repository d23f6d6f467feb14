// handlers/protected/mod.rs - handlers behind `jwt_auth_middleware`
//
// Each handler receives the verified caller as `Extension<AuthUser>` and
// passes that id to exactly one service call. Ownership scoping happens in
// the store, never in the handler.
pub mod events;
pub mod participants;
