// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Result rendering: pure draw lists and the raster backend.

pub mod composite;
pub mod overlay;
