//! OAuth 1.0a request signing (RFC 5849, HMAC-SHA1) and token-response
//! parsing.

use std::{
  collections::{BTreeMap, HashMap},
  time::{SystemTime, UNIX_EPOCH},
};

use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use perch_core::provider::RequestToken;
use rand_core::{OsRng, RngCore};
use sha1::Sha1;

use crate::error::{TwitterError, TwitterResult};

/// Everything except the RFC 3986 unreserved set: ALPHA / DIGIT / "-" / "." / "_" / "~".
const OAUTH_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
  .remove(b'-')
  .remove(b'.')
  .remove(b'_')
  .remove(b'~');

/// A token/secret pair used for the second half of the signing key.
#[derive(Debug, Clone, Copy)]
pub struct Token<'a> {
  pub token:  &'a str,
  pub secret: &'a str,
}

/// Signs requests on behalf of one consumer (application).
#[derive(Clone)]
pub struct OAuthSigner {
  consumer_key:    String,
  consumer_secret: String,
}

impl std::fmt::Debug for OAuthSigner {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("OAuthSigner").finish_non_exhaustive()
  }
}

impl OAuthSigner {
  pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
    Self {
      consumer_key:    consumer_key.into(),
      consumer_secret: consumer_secret.into(),
    }
  }

  /// Build the `Authorization` header value for a request.
  ///
  /// `params` are the query or form parameters sent with the request; they
  /// take part in the signature but not in the header. `oauth_extra` are
  /// additional `oauth_*` protocol parameters (e.g. `oauth_callback`).
  pub fn authorization_header(
    &self,
    method:      &str,
    url:         &str,
    params:      &[(String, String)],
    token:       Option<Token<'_>>,
    oauth_extra: &[(&str, &str)],
  ) -> TwitterResult<String> {
    let timestamp = SystemTime::now()
      .duration_since(UNIX_EPOCH)
      .map_err(|e| TwitterError::OAuth(format!("system clock before epoch: {e}")))?
      .as_secs()
      .to_string();

    self.header_with(method, url, params, token, oauth_extra, &generate_nonce(), &timestamp)
  }

  #[allow(clippy::too_many_arguments)]
  fn header_with(
    &self,
    method:      &str,
    url:         &str,
    params:      &[(String, String)],
    token:       Option<Token<'_>>,
    oauth_extra: &[(&str, &str)],
    nonce:       &str,
    timestamp:   &str,
  ) -> TwitterResult<String> {
    let mut oauth_params: BTreeMap<String, String> = BTreeMap::new();
    oauth_params.insert("oauth_consumer_key".into(), self.consumer_key.clone());
    oauth_params.insert("oauth_nonce".into(), nonce.into());
    oauth_params.insert("oauth_signature_method".into(), "HMAC-SHA1".into());
    oauth_params.insert("oauth_timestamp".into(), timestamp.into());
    oauth_params.insert("oauth_version".into(), "1.0".into());
    if let Some(t) = token {
      oauth_params.insert("oauth_token".into(), t.token.into());
    }
    for (k, v) in oauth_extra {
      oauth_params.insert((*k).into(), (*v).into());
    }

    let mut all_params = oauth_params.clone();
    for (k, v) in params {
      all_params.insert(k.clone(), v.clone());
    }

    let base = signature_base_string(method, url, &all_params);
    let signature = sign(&base, &self.consumer_secret, token.map_or("", |t| t.secret))?;
    oauth_params.insert("oauth_signature".into(), signature);

    let header = oauth_params
      .iter()
      .map(|(k, v)| format!("{}=\"{}\"", percent_encode(k), percent_encode(v)))
      .collect::<Vec<_>>()
      .join(", ");

    Ok(format!("OAuth {header}"))
  }
}

/// `METHOD&encoded(url)&encoded(sorted, encoded params)`.
pub fn signature_base_string(
  method: &str,
  url:    &str,
  params: &BTreeMap<String, String>,
) -> String {
  let mut encoded: Vec<(String, String)> = params
    .iter()
    .map(|(k, v)| (percent_encode(k), percent_encode(v)))
    .collect();
  encoded.sort();

  let param_string = encoded
    .iter()
    .map(|(k, v)| format!("{k}={v}"))
    .collect::<Vec<_>>()
    .join("&");

  format!(
    "{}&{}&{}",
    method.to_uppercase(),
    percent_encode(url),
    percent_encode(&param_string)
  )
}

/// Base64 HMAC-SHA1 of `base` keyed by `consumer_secret&token_secret`.
pub fn sign(base: &str, consumer_secret: &str, token_secret: &str) -> TwitterResult<String> {
  let key = format!("{}&{}", percent_encode(consumer_secret), percent_encode(token_secret));
  let mut mac = Hmac::<Sha1>::new_from_slice(key.as_bytes())
    .map_err(|e| TwitterError::OAuth(e.to_string()))?;
  mac.update(base.as_bytes());
  Ok(BASE64.encode(mac.finalize().into_bytes()))
}

pub fn percent_encode(s: &str) -> String {
  utf8_percent_encode(s, OAUTH_ENCODE_SET).to_string()
}

fn generate_nonce() -> String {
  let mut bytes = [0u8; 16];
  OsRng.fill_bytes(&mut bytes);
  hex::encode(bytes)
}

/// Parse the form-encoded body returned by `/oauth/request_token`.
pub fn parse_request_token(body: &str) -> TwitterResult<RequestToken> {
  let params: HashMap<String, String> = serde_urlencoded::from_str(body)
    .map_err(|e| TwitterError::InvalidTokenResponse(e.to_string()))?;

  if params.get("oauth_callback_confirmed").is_some_and(|v| v != "true") {
    return Err(TwitterError::InvalidTokenResponse("callback not confirmed".into()));
  }

  let field = |name: &str| {
    params
      .get(name)
      .filter(|v| !v.is_empty())
      .cloned()
      .ok_or_else(|| TwitterError::InvalidTokenResponse(format!("missing {name}")))
  };

  Ok(RequestToken {
    token:        field("oauth_token")?,
    token_secret: field("oauth_token_secret")?,
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  // The worked example from Twitter's "Creating a signature" guide.
  const CONSUMER_KEY: &str = "xvz1evFS4wEEPTGEFPHBog";
  const CONSUMER_SECRET: &str = "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw";
  const TOKEN: &str = "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb";
  const TOKEN_SECRET: &str = "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE";
  const NONCE: &str = "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg";
  const TIMESTAMP: &str = "1318622958";
  const URL: &str = "https://api.twitter.com/1.1/statuses/update.json";

  fn example_params() -> Vec<(String, String)> {
    vec![
      ("include_entities".into(), "true".into()),
      ("status".into(), "Hello Ladies + Gentlemen, a signed OAuth request!".into()),
    ]
  }

  #[test]
  fn percent_encoding_follows_rfc3986() {
    assert_eq!(percent_encode("hello world"), "hello%20world");
    assert_eq!(percent_encode("a+b=c&d"), "a%2Bb%3Dc%26d");
    assert_eq!(percent_encode("test-value_1.2~3"), "test-value_1.2~3");
    assert_eq!(percent_encode("☃"), "%E2%98%83");
  }

  #[test]
  fn base_string_matches_reference_example() {
    let mut params: BTreeMap<String, String> = example_params().into_iter().collect();
    params.insert("oauth_consumer_key".into(), CONSUMER_KEY.into());
    params.insert("oauth_nonce".into(), NONCE.into());
    params.insert("oauth_signature_method".into(), "HMAC-SHA1".into());
    params.insert("oauth_timestamp".into(), TIMESTAMP.into());
    params.insert("oauth_token".into(), TOKEN.into());
    params.insert("oauth_version".into(), "1.0".into());

    let base = signature_base_string("post", URL, &params);
    assert_eq!(
      base,
      "POST&https%3A%2F%2Fapi.twitter.com%2F1.1%2Fstatuses%2Fupdate.json&\
       include_entities%3Dtrue%26oauth_consumer_key%3Dxvz1evFS4wEEPTGEFPHBog%26\
       oauth_nonce%3DkYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg%26\
       oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1318622958%26\
       oauth_token%3D370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb%26\
       oauth_version%3D1.0%26status%3DHello%2520Ladies%2520%252B%2520Gentlemen%252C%2520\
       a%2520signed%2520OAuth%2520request%2521"
    );
    assert_eq!(sign(&base, CONSUMER_SECRET, TOKEN_SECRET).unwrap(), "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
  }

  #[test]
  fn header_carries_reference_signature() {
    let signer = OAuthSigner::new(CONSUMER_KEY, CONSUMER_SECRET);
    let header = signer
      .header_with(
        "POST",
        URL,
        &example_params(),
        Some(Token { token: TOKEN, secret: TOKEN_SECRET }),
        &[],
        NONCE,
        TIMESTAMP,
      )
      .unwrap();

    assert!(header.starts_with("OAuth "));
    assert!(header.contains("oauth_signature=\"hCtSmYh%2BiHYCEqBWrE7C7hYmtUk%3D\""), "{header}");
    // Request parameters are signed but never copied into the header.
    assert!(!header.contains("status="), "{header}");
  }

  #[test]
  fn callback_is_a_protocol_parameter() {
    let signer = OAuthSigner::new("key", "secret");
    let header = signer
      .authorization_header(
        "POST",
        "https://api.twitter.com/oauth/request_token",
        &[],
        None,
        &[("oauth_callback", "http://localhost:4455/app")],
      )
      .unwrap();
    assert!(header.contains("oauth_callback=\"http%3A%2F%2Flocalhost%3A4455%2Fapp\""));
    assert!(!header.contains("oauth_token="));
  }

  #[test]
  fn nonces_are_unique_hex() {
    let a = generate_nonce();
    let b = generate_nonce();
    assert_ne!(a, b);
    assert_eq!(a.len(), 32);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
  }

  #[test]
  fn parses_request_token_response() {
    let token = parse_request_token(
      "oauth_token=Z6eEdO8MOmk394WozF5oKyuAv855l4Mlqo7hhlSLik&\
       oauth_token_secret=Kd75W4OQfb2oJTV0vzGzeXftVAwgMnEK9MumzYcM&\
       oauth_callback_confirmed=true",
    )
    .unwrap();
    assert_eq!(token.token, "Z6eEdO8MOmk394WozF5oKyuAv855l4Mlqo7hhlSLik");
    assert_eq!(token.token_secret, "Kd75W4OQfb2oJTV0vzGzeXftVAwgMnEK9MumzYcM");
  }

  #[test]
  fn rejects_incomplete_token_response() {
    assert!(matches!(
      parse_request_token("oauth_token=abc"),
      Err(TwitterError::InvalidTokenResponse(_))
    ));
    assert!(matches!(
      parse_request_token("oauth_token=a&oauth_token_secret=b&oauth_callback_confirmed=false"),
      Err(TwitterError::InvalidTokenResponse(_))
    ));
  }
}
