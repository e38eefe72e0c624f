// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! End-to-end tests of the sync log bridge between peers.

mod convergence;
mod echo;
mod lifecycle;
mod mapping;
