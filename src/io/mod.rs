// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations: document persistence, playback transport, downloads.

pub mod download;
pub mod media;
pub mod serialization;
