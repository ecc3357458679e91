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

use std::error::Error;

/// A trait for types that can decode a specific kind of asset from a byte slice.
///
/// Implementors do the CPU-side work of parsing and decoding raw file data
/// into an engine-ready value. Each lane is specialized for a single type `A`.
pub trait AssetLoaderLane<A> {
    /// Parses a byte slice and converts it into an instance of `A`.
    ///
    /// # Parameters
    /// - `bytes`: The raw byte data read from an asset file.
    ///
    /// # Returns
    /// A `Result` containing the decoded value on success, or a boxed dynamic
    /// error on failure. The error must be thread-safe.
    fn load(&self, bytes: &[u8]) -> Result<A, Box<dyn Error + Send + Sync + 'static>>;
}
