// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Baize Data
//!
//! Storage layouts of the texture cache: the pool of device resource ids and
//! the table of resident textures with its name index and logical clock.
//! Nothing in this crate decides *when* a texture is loaded or evicted; the
//! agents crate drives these structures.

#![warn(missing_docs)]

pub mod textures;
