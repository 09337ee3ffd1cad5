//! Domain primitives, ports and services.
//!
//! Purpose: define the strongly typed user entity and the use-cases exposed
//! to inbound adapters. Nothing here depends on HTTP or database crates.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - TraceId: request-scoped correlation identifier.
//! - User and its value types, plus the validated create/update payloads.
//! - UserService: implementation of the user driving ports.

pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;
mod user_service;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EMAIL_MAX, EMAIL_MIN, EmailAddress, NewUser, USER_NAME_MAX, User, UserChanges, UserDraft,
    UserId, UserName, UserValidationError,
};
pub use self::user_service::UserService;
