// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! - `catalogue`: categories, markers and bare companies
//! - `records`: record writes issued by the import committer

pub mod catalogue;
pub mod records;
