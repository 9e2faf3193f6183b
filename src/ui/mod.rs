// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the CarBrands application.

pub mod canvas;
pub mod results;
pub mod settings;
pub mod toolbar;
pub mod viewer;
