// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Entity identifiers.

mod guid;

pub(crate) use guid::ENTITYKIND_READER_WITH_KEY;
pub use guid::GUID;
