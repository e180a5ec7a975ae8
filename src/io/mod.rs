// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for map images and floor records.

pub mod media;
pub mod serialization;
