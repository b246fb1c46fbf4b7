use plena_booking_domain::NamespaceSettings;
use plena_booking_utils::create_random_secret;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: usize,
    /// Base URL used when rendering capability and approval links.
    pub public_base_url: String,
    /// Secret key used to sign capability tokens and hash links. When it is
    /// not provided every restart invalidates all previously issued links.
    pub link_secret: String,
    /// Lifetime in millis of an issued capability token.
    pub link_expiry: i64,
    /// Maximum allowed duration in millis for querying availability.
    /// This is used to avoid having clients ask for slots in a timespan of
    /// several years which will take a lot of time to compute and is also
    /// not very useful information to query about anyways.
    pub availability_query_duration_limit: i64,
    /// How far past an anchor appointment the adjacent-availability page
    /// looks, in millis.
    pub adjacent_lookahead: i64,
    /// Candidate step in millis for adjacent-availability pages. Finer than
    /// the regular grid so small gaps next to an appointment are still
    /// offered.
    pub adjacent_interval: i64,
    /// Time-to-live in millis of a cached availability response.
    pub availability_cache_ttl: i64,
    /// Maximum number of cached availability responses.
    pub availability_cache_size: usize,
    /// Booking namespaces served by this instance.
    pub namespaces: Vec<NamespaceSettings>,
}

const MILLIS_PER_MINUTE: i64 = 1000 * 60;
const MILLIS_PER_DAY: i64 = MILLIS_PER_MINUTE * 60 * 24;

impl Config {
    pub fn new() -> Self {
        let default_port = "5000";
        let port = std::env::var("PORT").unwrap_or(default_port.into());
        let port = match port.parse::<usize>() {
            Ok(port) => port,
            Err(_) => {
                warn!(
                    "The given PORT: {} is not valid, falling back to the default port: {}.",
                    port, default_port
                );
                default_port.parse::<usize>().unwrap()
            }
        };

        let public_base_url = std::env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{}", port));

        let link_secret = match std::env::var("LINK_SECRET") {
            Ok(secret) => secret,
            Err(_) => {
                info!(
                    "Did not find LINK_SECRET environment variable. Going to create one; \
                     links issued before this restart are no longer valid."
                );
                create_random_secret(32)
            }
        };

        let namespaces = match std::env::var("NAMESPACES") {
            Ok(raw) => match serde_json::from_str::<Vec<NamespaceSettings>>(&raw) {
                Ok(namespaces) => namespaces,
                Err(e) => {
                    warn!("The given NAMESPACES value is not valid JSON: {}.", e);
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        Self {
            port,
            public_base_url,
            link_secret,
            link_expiry: 30 * MILLIS_PER_DAY,
            availability_query_duration_limit: 31 * MILLIS_PER_DAY,
            adjacent_lookahead: 30 * MILLIS_PER_MINUTE,
            adjacent_interval: 15 * MILLIS_PER_MINUTE,
            availability_cache_ttl: MILLIS_PER_MINUTE,
            availability_cache_size: 256,
            namespaces,
        }
    }

    pub fn namespace(&self, slug: &str) -> Option<&NamespaceSettings> {
        self.namespaces.iter().find(|ns| ns.slug == slug)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
