use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Query};
use futures::future::{Ready, ready};
use serde::Deserialize;

/// Raw token sent by the caller, if any. Taken from `Authorization: Bearer`
/// or, failing that, the `token` query parameter. Never rejects the request:
/// validation belongs to the handler so failures follow the response
/// convention.
pub struct BearerToken(pub Option<String>);

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

impl BearerToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl FromRequest for BearerToken {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let from_header = req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim);

        let token = match from_header {
            Some(t) => Some(t.to_string()),
            None => Query::<TokenQuery>::from_query(req.query_string())
                .ok()
                .and_then(|q| q.into_inner().token),
        };

        ready(Ok(BearerToken(token.filter(|t| !t.is_empty()))))
    }
}
