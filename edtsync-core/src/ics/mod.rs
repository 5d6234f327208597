//! Reading timetable exports (.ics) into canonical events.

mod normalize;
mod source;
mod text;

pub use normalize::{MalformedComponent, Normalized, Normalizer};
pub use source::IcsSource;
