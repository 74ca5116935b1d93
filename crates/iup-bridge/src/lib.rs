// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// iup-bridge — Native collaborator abstractions for the image core.
//
// Drivers implement `NativeImageFactory` and `ScreenMetrics`; the image core
// only depends on these traits. The headless backend stands in for a real
// driver on CI and in tests.

pub mod stub;
pub mod traits;

pub use stub::HeadlessBackend;
pub use traits::{Backend, NativeHandle, NativeImageFactory, ScreenMetrics};

/// Returns the backend used when no native driver is linked in.
pub fn default_backend() -> Box<dyn Backend> {
    Box::new(stub::HeadlessBackend::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_backend_is_headless() {
        let backend = default_backend();
        assert_eq!(backend.backend_name(), "Headless");
        assert_eq!(backend.screen_dpi(), stub::DEFAULT_DPI);
    }
}
