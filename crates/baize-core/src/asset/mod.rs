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

//! Provides the contracts through which decoded images reach the texture cache.
//!
//! The cache never decodes files itself. It asks an [`ImageSource`] for a
//! [`SourceImage`] by name; how the name maps to pixels (files on disk, an
//! archive, procedural generation) is up to the implementation.

mod image_source;

pub use image_source::*;
