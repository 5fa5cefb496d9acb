// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use booth_map_domain::{EventYear, PhoneRegion};

/// Number of rows committed per store request.
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Pipeline configuration shared by every import session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    /// Rows per commit batch. Zero is treated as one.
    pub batch_size: usize,
    /// Phone numbering conventions used by the normalizer.
    pub phone_region: PhoneRegion,
}

impl ImportConfig {
    /// Returns the batch size, never less than one.
    #[must_use]
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }

    /// Builds the per-session context for an upload.
    #[must_use]
    pub fn context(&self, target_year: Option<EventYear>) -> ImportContext {
        ImportContext {
            phone_region: self.phone_region.clone(),
            target_year,
        }
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            phone_region: PhoneRegion::default(),
        }
    }
}

/// Per-session settings that influence normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ImportContext {
    /// Phone numbering conventions.
    pub phone_region: PhoneRegion,
    /// Event year applied to year-scoped rows without a year column.
    pub target_year: Option<EventYear>,
}
