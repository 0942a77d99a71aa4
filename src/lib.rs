// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Run-Tracker: record runs from live location updates
//!
//! This crate provides the recording session state machine, the async
//! driver that feeds it from a location provider, and the hand-off of
//! finished runs to Firestore.

pub mod config;
pub mod db;
pub mod error;
pub mod geometry;
pub mod models;
pub mod services;
pub mod time_utils;
pub mod views;
