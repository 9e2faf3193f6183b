// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: image intake, the detection service and exports.

pub mod demo;
pub mod detection_client;
pub mod export;
pub mod intake;
