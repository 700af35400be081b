use axum::{
    extract::FromRequestParts,
    http::{
        HeaderMap, HeaderValue,
        header::{COOKIE, SET_COOKIE},
        request::Parts,
    },
    response::{IntoResponseParts, ResponseParts},
};
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "newslens_session";
pub const SESSION_HEADER: &str = "x-session-id";

/// Opaque identifier of one client's session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Only well-formed ids are accepted; anything else starts a new session.
    pub fn parse(raw: &str) -> Option<Self> {
        Uuid::parse_str(raw.trim()).ok().map(Self)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The caller's session, taken from the `x-session-id` header or the
/// session cookie. Callers without one get a fresh session, which is handed
/// back on the response.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: SessionId,
    pub is_new: bool,
}

fn session_from_cookie(headers: &HeaderMap) -> Option<SessionId> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| SessionId::parse(value))
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let existing = parts
            .headers
            .get(SESSION_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(SessionId::parse)
            .or_else(|| session_from_cookie(&parts.headers));

        Ok(match existing {
            Some(id) => Session { id, is_new: false },
            None => Session {
                id: SessionId::new(),
                is_new: true,
            },
        })
    }
}

impl IntoResponseParts for Session {
    type Error = Infallible;

    fn into_response_parts(self, mut res: ResponseParts) -> Result<ResponseParts, Self::Error> {
        if let Ok(value) = HeaderValue::from_str(&self.id.to_string()) {
            res.headers_mut().insert(SESSION_HEADER, value);
        }
        if self.is_new
            && let Ok(cookie) = HeaderValue::from_str(&format!(
                "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax",
                self.id
            ))
        {
            res.headers_mut().append(SET_COOKIE, cookie);
        }
        Ok(res)
    }
}
