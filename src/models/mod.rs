// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Fog engine data model: masks, floors, persisted records and the session.

pub mod floor;
pub mod fog;
pub mod intent;
pub mod record;
pub mod session;
