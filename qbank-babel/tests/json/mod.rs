//! JSON format tests

mod round_trip;
