//! Application-wide constants
//!
//! This module contains all constant values used throughout the application.
//! Constants are grouped by their purpose for better organization.

// =============================================================================
// SERVER DEFAULTS
// =============================================================================

/// Default server host address
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Default server port
pub const DEFAULT_SERVER_PORT: u16 = 8080;

// =============================================================================
// DATABASE DEFAULTS
// =============================================================================

/// Default maximum database connections in the pool
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 20;

// =============================================================================
// GROUPING DEFAULTS
// =============================================================================

/// Default upper bound on members per group
pub const DEFAULT_MAX_GROUP_SIZE: usize = 20;

/// Default threshold below which an organization counts as small
pub const DEFAULT_MIN_GROUP_SIZE: usize = 8;

/// Prefix for generated group names ("Group 1", "Group 2", ...)
pub const GROUP_NAME_PREFIX: &str = "Group";

// =============================================================================
// SCORING
// =============================================================================

/// Lowest score a judge may award
pub const MIN_SCORE: f64 = 0.0;

/// Highest score a judge may award
pub const MAX_SCORE: f64 = 10.0;

/// Round assumed when a request omits it
pub const DEFAULT_ROUND_NUMBER: i32 = 1;

/// Decimal places used when presenting averages and rates
pub const DISPLAY_DECIMALS: i32 = 2;

// =============================================================================
// CHECK-IN
// =============================================================================

/// Length of generated QR code tokens
pub const QR_CODE_LENGTH: usize = 8;

/// Attempts at generating a free QR code token before giving up
pub const QR_CODE_MAX_ATTEMPTS: usize = 16;

/// Number of trailing phone characters used as a verification factor
pub const PHONE_SUFFIX_LENGTH: usize = 4;

/// Check-in event actions
pub mod checkin_actions {
    pub const CHECK_IN: &str = "check_in";
    pub const MANUAL_CHECK_IN: &str = "manual_check_in";
    pub const CANCEL: &str = "cancel";
}

/// Source recorded on events triggered from the admin console
pub const ADMIN_SOURCE: &str = "ADMIN";

/// Default size of the recent check-in feed
pub const DEFAULT_RECENT_CHECKINS: i64 = 50;

/// Maximum size of the recent check-in feed
pub const MAX_RECENT_CHECKINS: i64 = 500;

// =============================================================================
// API VERSIONING
// =============================================================================

/// API base path
pub const API_BASE_PATH: &str = "/api/v1";

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for paginated results
pub const DEFAULT_PAGE_SIZE: u32 = 50;

/// Maximum page size for paginated results
pub const MAX_PAGE_SIZE: u32 = 500;

// =============================================================================
// VALIDATION
// =============================================================================

/// Maximum participant or judge name length
pub const MAX_NAME_LENGTH: u64 = 100;

/// Maximum organization name length
pub const MAX_ORGANIZATION_LENGTH: u64 = 200;

/// Maximum group name length
pub const MAX_GROUP_NAME_LENGTH: u64 = 50;

/// Maximum group description length
pub const MAX_GROUP_DESCRIPTION_LENGTH: u64 = 2000;

/// Maximum admin note length
pub const MAX_NOTE_LENGTH: u64 = 500;

/// Maximum number of items accepted by a batch endpoint
pub const MAX_BATCH_SIZE: usize = 1000;
