// SPDX-FileCopyrightText: 2025 Fredrik Lanker <fredrik@lanker.se>
//
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Client-side routing for the single-page frontend.
//!
//! [`routes::ROUTES`] maps locations to views; [`app::App`] keeps history and
//! the navigation shell.

pub mod app;
pub mod routes;

pub use app::{App, Component, ShellPart, Transition};
pub use routes::{resolve, RouteMatch, ViewKind};
