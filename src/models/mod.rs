mod backend;
mod notification;

pub use backend::{
    BackendConfig, BackendKind, DeliveryFields, EmailFields, PushoverFields, ResolvedConfig,
};
pub use notification::{
    BackendOutcome, DeliveryStatus, NotificationRequest, Outcome, OutcomeStatus,
};
