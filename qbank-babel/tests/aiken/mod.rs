//! Aiken format tests

mod round_trip;
