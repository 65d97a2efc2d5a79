//! # beautydesk-entity
//!
//! Domain entity models for the BeautyDesk authentication core. Every struct
//! in this crate represents a database table row or a domain value object.

pub mod attempt;
pub mod identity;
