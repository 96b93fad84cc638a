pub mod checkin;
pub mod document;

pub use checkin::{
    AttendanceStats, CheckIn, CheckInFilter, CheckInQueryParams, NewCheckInRequest,
    StatsQueryParams,
};
pub use document::{
    Class, Collection, Document, FieldValue, Fields, Student, StudentQueryParams, phone_digits,
};
