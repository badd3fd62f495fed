//! Reservation ledger: stock that is locked for a client but not yet sold.
//!
//! A reservation is open from the moment it is placed until exactly one of its
//! two terminal transitions runs: conversion into a sale, or release back to
//! stock. Both consume the [`Reservation`] value.

pub mod ledger;
pub mod reservation;

pub use ledger::ReservationLedger;
pub use reservation::{ConvertToSale, PlaceLock, Reservation, plan_lock};
