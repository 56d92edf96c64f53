// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Middleware modules (CORS, request logging).

pub mod cors;
pub mod logging;

pub use cors::add_cors_headers;
pub use logging::log_request;
