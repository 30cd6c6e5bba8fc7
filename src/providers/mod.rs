// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! External API providers.

pub mod trongrid;

pub use trongrid::{AccountPage, TronGridClient, TronGridError};
