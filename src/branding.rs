pub const APP_DISPLAY_NAME: &str = "Launchpad";

/// Bundle id of this launcher; excluded from its own grid.
pub const OWN_BUNDLE_ID: &str = "red.launchpad";

pub const PROJECT_QUALIFIER: &str = "com";
pub const PROJECT_ORGANIZATION: &str = "launchpad";
pub const PROJECT_APPLICATION: &str = "Launchpad";
