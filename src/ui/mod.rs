// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the fog map viewer.

pub mod canvas;
pub mod help;
pub mod toolbar;
