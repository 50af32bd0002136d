// =============================================================================
// FEATURE SERVICE
// =============================================================================

/// Public FeatureServer the hazard layers live in
pub const DEFAULT_FEATURE_SERVICE_URL: &str =
    "https://services2.arcgis.com/RQcpPaCpMAXzUI5g/arcgis/rest/services/DeafMap_New_Test_Version/FeatureServer";

/// Layer ids offered as hazard categories when none are configured
pub const DEFAULT_HAZARD_LAYER_IDS: [i64; 5] = [1, 2, 3, 4, 5];

/// Layer titles grouped under "Hazards" and shown by default
pub const HAZARD_LAYER_TITLES: [&str; 5] = [
    "Severe Weather",
    "Traffic",
    "Buildings",
    "Public Safety",
    "Utility Problems",
];

/// Group title for the hazard layers
pub const HAZARDS_GROUP_TITLE: &str = "Hazards";

/// Schema field carrying the subcategory coded-value domain
pub const HAZARD_SUBCATEGORY_FIELD: &str = "Hazard_Subcategory";

/// Spatial reference of captured points (WGS84)
pub const WGS84_WKID: i64 = 4326;

// =============================================================================
// MAP VIEW DEFAULTS
// =============================================================================

pub const DEFAULT_BASEMAP: &str = "streets-navigation-vector";
pub const DEFAULT_ZOOM: u8 = 14;
pub const DEFAULT_CENTER_LONGITUDE: f64 = -77.6109;
pub const DEFAULT_CENTER_LATITUDE: f64 = 43.1566;

// =============================================================================
// HAZARD WIZARD LIMITS
// =============================================================================

/// Maximum description length in characters
pub const MAX_DESCRIPTION_CHARS: usize = 250;

/// Files at or above this size are rejected (10MB)
pub const MAX_MEDIA_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Capacity of each per-session event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Hazard sessions untouched this long are torn down (30 minutes)
pub const DEFAULT_SESSION_IDLE_TIMEOUT_SECS: u64 = 30 * 60;

/// Delay between idle-session sweeps
pub const SESSION_SWEEP_INTERVAL_SECS: u64 = 60;

// =============================================================================
// PROFILE DEFAULTS
// =============================================================================

/// Username used when a profile document has none
pub const FALLBACK_USERNAME: &str = "User";

/// Firestore collection holding user profiles
pub const USERS_COLLECTION: &str = "users";

/// Firestore collection reserving unique usernames
pub const USERNAMES_COLLECTION: &str = "usernames";
