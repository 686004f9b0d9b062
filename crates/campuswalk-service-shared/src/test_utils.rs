//! Test utilities for handler testing.
//!
//! Provides a state loaded from the shared campus map fixture.

use std::path::PathBuf;
use std::sync::OnceLock;

use campuswalk_lib::ReverseGeocoder;

use crate::state::AppState;

/// Path to the campus map fixture.
pub const TEST_FIXTURE_PATH: &str = concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/../../docs/fixtures/campus_map.json"
);

static TEST_STATE: OnceLock<AppState> = OnceLock::new();

/// Shared fixture-backed state without a geocoder.
///
/// # Panics
///
/// Panics if the fixture cannot be loaded, which indicates a broken test setup.
pub fn test_state() -> AppState {
    TEST_STATE
        .get_or_init(|| {
            let path = fixture_path();
            AppState::load(&path, None)
                .unwrap_or_else(|e| panic!("failed to load test fixture from {:?}: {}", path, e))
        })
        .clone()
}

/// Fresh fixture-backed state using `geocoder`.
pub fn test_state_with_geocoder(geocoder: ReverseGeocoder) -> AppState {
    let path = fixture_path();
    AppState::load(&path, Some(geocoder))
        .unwrap_or_else(|e| panic!("failed to load test fixture from {:?}: {}", path, e))
}

pub fn fixture_path() -> PathBuf {
    PathBuf::from(TEST_FIXTURE_PATH)
}

/// Node positions in the fixture, as `(lat, lon)`.
pub mod fixture_nodes {
    /// Main gate at the south end of Scholars Avenue.
    pub const MAIN_GATE: (f64, f64) = (22.3140, 87.3100);

    /// Junction of Hall Lane and Tagore Path.
    pub const HALL: (f64, f64) = (22.3160, 87.3112);

    /// East end of the unnamed path past Library Road.
    pub const EAST_END: (f64, f64) = (22.3150, 87.3124);

    /// North end of Scholars Avenue.
    pub const NORTH_END: (f64, f64) = (22.3170, 87.3100);

    /// Staff colony, not connected to the main campus network.
    pub const STAFF_COLONY: (f64, f64) = (22.3205, 87.3200);
}

/// Unique request id for tests.
pub fn test_request_id() -> String {
    format!("test-{}", crate::RequestId::generate())
}
