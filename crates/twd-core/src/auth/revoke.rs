use crate::api::{ApiError, BearerToken};

/// Asks the provider to invalidate `token`.
///
/// # Errors
/// Returns an error on transport failure or a non-2xx status.
pub async fn revoke_token(
    http: &reqwest::Client,
    revoke_url: &str,
    client_id: &str,
    token: &BearerToken,
) -> Result<(), ApiError> {
    let response = http
        .post(revoke_url)
        .form(&[("client_id", client_id), ("token", token.secret())])
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::from_status(status.as_u16(), &body));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn test_revoke_posts_form_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/revoke"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("client_id=cid"))
            .and(body_string_contains("token=tok-123"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/oauth2/revoke", server.uri());
        revoke_token(
            &reqwest::Client::new(),
            &url,
            "cid",
            &BearerToken::new("tok-123"),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_revoke_reports_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_string(r#"{"status":400,"message":"Invalid token"}"#),
            )
            .mount(&server)
            .await;

        let err = revoke_token(
            &reqwest::Client::new(),
            &server.uri(),
            "cid",
            &BearerToken::new("bad"),
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "HTTP 400: Invalid token");
    }
}
