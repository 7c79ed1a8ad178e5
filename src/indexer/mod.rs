// SPDX-License-Identifier: MIT OR Apache-2.0

//! Indexer module - builds the persisted catalog store

pub mod index;
