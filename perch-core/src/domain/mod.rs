//! Domain types shared between the scheduler client and the controller.

pub mod job;
pub mod reservation;
pub mod submission;
