// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! `tracing` bootstrap for embedding shells.

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "colloquy=info";

/// Installs a global fmt subscriber writing to stderr.
///
/// `RUST_LOG` wins over `filter` when set. Returns `false` if a global subscriber was already
/// installed, which makes repeated calls harmless.
pub fn init(filter: Option<&str>) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter.unwrap_or(DEFAULT_FILTER)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::init;

    #[test]
    fn second_init_is_a_no_op() {
        let _ = init(Some("colloquy=debug"));
        assert!(!init(None));
    }
}
