//! The booking vocabulary embedded in calendar event titles and
//! descriptions. The external calendar is the only datastore for
//! appointments, so ownership and role of an event are encoded as exact
//! marker tokens that a generic calendar API round-trips untouched.
//!
//! All functions here are pure text functions with no side effects.

use url::Url;

pub const REQUEST_PREFIX: &str = "REQUEST: ";
pub const CURRENT_LOCATION_TITLE: &str = "CURRENT_LOCATION";

const EVENT_MARKER: &str = "__EVENT__";
const MEMBER_MARKER: &str = "__EVENT__MEMBER__";
const CONTAINER_MARKER: &str = "__EVENT__CONTAINER__";

/// Role of an event within one namespace (booking product).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NamespaceRole {
    /// An actual booked appointment belonging to the namespace.
    Member,
    /// An umbrella event that bookable sub-slots nest inside. Never busy.
    Container,
    None,
}

/// Parsed view of an event's title and description.
#[derive(Clone, Debug, PartialEq)]
pub struct EventTag {
    /// Pending-approval marker (`REQUEST: ` title prefix).
    pub is_request: bool,
    /// Title with the request prefix and role markers stripped, for
    /// display.
    pub clean_title: String,
    /// Sentinel event carrying the business owner's live location. Excluded
    /// from every scheduling computation.
    pub is_current_location: bool,
}

impl EventTag {
    pub fn parse(title: &str, _description: &str) -> Self {
        let is_request = title.starts_with(REQUEST_PREFIX);
        let stripped = if is_request {
            &title[REQUEST_PREFIX.len()..]
        } else {
            title
        };
        // Role tokens are plumbing, not display text.
        let clean_title = if stripped.contains(EVENT_MARKER) {
            stripped
                .split_whitespace()
                .filter(|word| !word.contains(EVENT_MARKER))
                .collect::<Vec<_>>()
                .join(" ")
        } else {
            stripped.to_string()
        };
        Self {
            is_request,
            is_current_location: title == CURRENT_LOCATION_TITLE,
            clean_title,
        }
    }
}

fn has_token(title: &str, description: &str, token: &str) -> bool {
    title.contains(token) || description.contains(token)
}

/// Resolves the role an event plays for `namespace`. Matching is
/// case-sensitive on the exact marker tokens; the namespace slug appearing
/// in free text is not a match.
pub fn namespace_role(title: &str, description: &str, namespace: &str) -> NamespaceRole {
    let member = format!("{}{}", namespace, MEMBER_MARKER);
    let container = format!("{}{}", namespace, CONTAINER_MARKER);

    if has_token(title, description, &member) {
        NamespaceRole::Member
    } else if has_token(title, description, &container) {
        NamespaceRole::Container
    } else {
        NamespaceRole::None
    }
}

/// Whether the event carries the plain ownership marker for `namespace`,
/// with or without a role suffix.
pub fn belongs_to_namespace(title: &str, description: &str, namespace: &str) -> bool {
    has_token(title, description, &format!("{}{}", namespace, EVENT_MARKER))
}

/// Whether the event acts purely as a container for some namespace. Used by
/// the general blocking scope, which must not treat containers as
/// commitments. An event that also carries a member marker is a booked
/// appointment first and still blocks, same precedence as `namespace_role`.
pub fn is_pure_container(title: &str, description: &str) -> bool {
    has_token(title, description, CONTAINER_MARKER)
        && !has_token(title, description, MEMBER_MARKER)
}

/// Accept/decline hyperlinks embedded in a pending request's description.
#[derive(Debug, Default, PartialEq)]
pub struct ApprovalLinks {
    pub accept_url: Option<Url>,
    pub decline_url: Option<Url>,
}

/// Locates anchor-style hyperlinks (`href="…"`) whose URL path ends in
/// `/confirm` or `/decline`.
pub fn extract_approval_links(description: &str) -> ApprovalLinks {
    let mut links = ApprovalLinks::default();

    let mut rest = description;
    while let Some(pos) = rest.find("href=\"") {
        rest = &rest[pos + "href=\"".len()..];
        let Some(end) = rest.find('"') else {
            break;
        };
        if let Ok(url) = Url::parse(&rest[..end]) {
            if url.path().ends_with("/confirm") {
                links.accept_url.get_or_insert(url);
            } else if url.path().ends_with("/decline") {
                links.decline_url.get_or_insert(url);
            }
        }
        rest = &rest[end + 1..];
    }

    links
}

/// Booking facts recovered from a member event's display title, shaped
/// `"<n> minute <service> with <client> - <business>"`. Each part is
/// optional; titles written by hand may carry only some of them.
#[derive(Debug, Default, PartialEq)]
pub struct BookingDetails {
    pub duration_minutes: Option<i64>,
    pub service: Option<String>,
    pub client_name: Option<String>,
}

pub fn parse_booking_details(clean_title: &str) -> BookingDetails {
    let mut details = BookingDetails::default();

    // Trailing "- <business>" is branding, not data.
    let title = match clean_title.rsplit_once(" - ") {
        Some((head, _business)) => head,
        None => clean_title,
    };

    let service_part = match title.split_once(" with ") {
        Some((head, client)) => {
            let client = client.trim();
            if !client.is_empty() {
                details.client_name = Some(client.to_string());
            }
            head
        }
        None => title,
    };

    match service_part.split_once(" minute ") {
        Some((num, service)) => {
            if let Ok(minutes) = num.trim().parse::<i64>() {
                details.duration_minutes = Some(minutes);
            }
            let service = service.trim();
            if !service.is_empty() {
                details.service = Some(service.to_string());
            }
        }
        None => {
            let service = service_part.trim();
            if !service.is_empty() {
                details.service = Some(service.to_string());
            }
        }
    }

    details
}
