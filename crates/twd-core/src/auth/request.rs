//! Implicit-grant authorization request.

use std::collections::HashMap;

/// Implicit grant: the token comes back in the redirect fragment.
pub const RESPONSE_TYPE: &str = "token";

const STATE_LEN: usize = 30;
const STATE_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// Key/value pairs carried by a redirect (query and fragment merged).
pub type RedirectParams = HashMap<String, String>;

/// Generates an opaque state nonce from the unreserved URL alphabet.
pub fn generate_state() -> String {
    let mut state = String::with_capacity(STATE_LEN);
    while state.len() < STATE_LEN {
        let id = uuid::Uuid::new_v4();
        // Bytes 6 and 8 carry the UUID version/variant bits.
        for (idx, byte) in id.as_bytes().iter().enumerate() {
            if idx == 6 || idx == 8 || state.len() == STATE_LEN {
                continue;
            }
            if let Some(index) = alphabet_index(*byte) {
                state.push(char::from(STATE_ALPHABET[index]));
            }
        }
    }
    state
}

/// Maps a random byte onto the alphabet, rejecting the bytes past the last
/// whole multiple of its length so every symbol is equally likely.
fn alphabet_index(byte: u8) -> Option<usize> {
    let len = STATE_ALPHABET.len();
    let limit = 256 - 256 % len;
    let byte = usize::from(byte);
    (byte < limit).then_some(byte % len)
}

/// One sign-in attempt's authorization parameters.
#[derive(Debug, Clone)]
pub struct AuthorizeRequest {
    client_id: String,
    redirect_uri: String,
    scopes: Vec<String>,
    force_verify: bool,
    state: String,
}

impl AuthorizeRequest {
    /// Creates a request with a fresh state nonce.
    pub fn new(
        client_id: impl Into<String>,
        redirect_uri: impl Into<String>,
        scopes: &[String],
        force_verify: bool,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scopes: scopes.to_vec(),
            force_verify,
            state: generate_state(),
        }
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// Builds the full authorization URL.
    pub fn url(&self, authorize_url: &str) -> String {
        let scope = self.scopes.join(" ");
        let force_verify = if self.force_verify { "true" } else { "false" };
        let params = [
            ("client_id", self.client_id.as_str()),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("response_type", RESPONSE_TYPE),
            ("scope", scope.as_str()),
            ("force_verify", force_verify),
            ("state", self.state.as_str()),
        ];

        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();

        format!("{authorize_url}?{query}")
    }
}

/// Parses redirect parameters from pasted or captured input.
///
/// Accepts a full redirect URL (query and fragment are merged, fragment
/// wins), a bare `key=value&...` string, or one starting with `#` or `?`.
/// Anything else yields an empty map.
pub fn parse_redirect_params(input: &str) -> RedirectParams {
    let value = input.trim();
    if value.is_empty() {
        return RedirectParams::new();
    }

    if let Ok(url) = url::Url::parse(value)
        && url.has_host()
    {
        let mut params: RedirectParams = url.query_pairs().into_owned().collect();
        if let Some(fragment) = url.fragment() {
            params.extend(parse_pairs(fragment));
        }
        return params;
    }

    let trimmed = value.trim_start_matches(['#', '?']);
    if !trimmed.contains('=') {
        return RedirectParams::new();
    }
    parse_pairs(trimmed)
}

fn parse_pairs(raw: &str) -> RedirectParams {
    url::form_urlencoded::parse(raw.as_bytes())
        .into_owned()
        .filter(|(k, _)| !k.is_empty())
        .collect()
}
