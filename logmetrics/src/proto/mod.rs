// Generated by proto_generator; do not edit by hand.
#[rustfmt::skip]
pub mod prometheus;
