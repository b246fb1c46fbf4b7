use chrono::{DateTime, Utc};
use plena_booking_api_structs::dtos::AppointmentLinksDTO;
use plena_booking_domain::{CapabilityClaims, CapabilityCodec, LinkPayload, ID};

/// Renders the full link set for one appointment: capability links for the
/// client and hash links for the owner's approval mail.
pub fn issue_links(
    codec: &CapabilityCodec,
    base_url: &str,
    event_id: &ID,
    email: &str,
    expires_at: DateTime<Utc>,
) -> AppointmentLinksDTO {
    let token = codec.issue(&CapabilityClaims {
        event_id: event_id.clone(),
        email: email.to_string(),
        expires_at,
    });

    let payload = LinkPayload {
        event_id: event_id.clone(),
        email: Some(email.to_string()),
    };
    let (json, key) = encode_hash_link(codec, &payload);
    // The JSON payload travels URL-encoded in the `data` query parameter;
    // the query parser decodes it back to exactly the signed bytes.
    let data: String = url::form_urlencoded::byte_serialize(json.as_bytes()).collect();

    AppointmentLinksDTO {
        view_url: format!("{}/api/v1/appointments/{}?token={}", base_url, event_id, token),
        cancel_url: format!(
            "{}/api/v1/appointments/{}/cancel?token={}",
            base_url, event_id, token
        ),
        // PUT on the same resource as the view link.
        edit_url: format!("{}/api/v1/appointments/{}?token={}", base_url, event_id, token),
        confirm_url: format!("{}/api/v1/requests/confirm?data={}&key={}", base_url, data, key),
        decline_url: format!("{}/api/v1/requests/decline?data={}&key={}", base_url, data, key),
        token,
        expires_at: expires_at.timestamp_millis(),
    }
}

/// Serializes and signs a link payload. The MAC covers the raw JSON string,
/// not any transport encoding of it.
pub fn encode_hash_link(codec: &CapabilityCodec, payload: &LinkPayload) -> (String, String) {
    let json = serde_json::to_string(payload).expect("link payload always serializes to JSON");
    let key = codec.sign_link_payload(&json);
    (json, key)
}

/// Authenticates and decodes a mailed hash link. `data` is the JSON payload
/// as the query parser delivers it, already URL-decoded. `None` means the
/// link was tampered with or malformed; callers treat both the same.
pub fn decode_hash_link(codec: &CapabilityCodec, data: &str, key: &str) -> Option<LinkPayload> {
    if !codec.verify_link_payload(data, key) {
        return None;
    }
    serde_json::from_str(data).ok()
}
