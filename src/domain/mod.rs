mod log;
mod parcel;

pub use log::{ActionRecord, EnforcementLogEntry};
pub use parcel::{
    DeliveryChannel, FieldKind, Parcel, ParcelField, ParcelStatus, RecommendedStep,
};
