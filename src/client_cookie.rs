//! Identifies the browser client that a request comes from.
//!
//! Tabs of the same browser share local storage, so the client needs to know
//! which browser sent a request. The client ID lives in a private cookie.

use axum_extra::extract::{
    PrivateCookieJar,
    cookie::{Cookie, SameSite},
};
use time::Duration;

use crate::{Error, tabs::ClientId};

pub(crate) const COOKIE_CLIENT_ID: &str = "client_id";
/// How long a browser keeps its client ID without visiting.
pub(crate) const CLIENT_COOKIE_DURATION: Duration = Duration::days(365);

/// Get the client ID from `jar`.
///
/// # Errors
///
/// Returns [Error::ClientCookieMissing] if the cookie is missing or does not hold a valid ID.
pub(crate) fn get_client_id(jar: &PrivateCookieJar) -> Result<ClientId, Error> {
    jar.get(COOKIE_CLIENT_ID)
        .and_then(|cookie| cookie.value_trimmed().parse().ok())
        .ok_or(Error::ClientCookieMissing)
}

/// Get the client ID from `jar`, or create one and add it to the jar.
pub(crate) fn get_or_create_client_id(jar: PrivateCookieJar) -> (PrivateCookieJar, ClientId) {
    match get_client_id(&jar) {
        Ok(client_id) => (jar, client_id),
        Err(_) => {
            let client_id = ClientId::new();
            tracing::debug!("Issuing client ID {client_id}");

            (set_client_id_cookie(jar, client_id), client_id)
        }
    }
}

/// Add the client ID cookie to `jar`.
pub(crate) fn set_client_id_cookie(jar: PrivateCookieJar, client_id: ClientId) -> PrivateCookieJar {
    jar.add(
        Cookie::build((COOKIE_CLIENT_ID, client_id.to_string()))
            .path("/")
            .max_age(CLIENT_COOKIE_DURATION)
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(true),
    )
}

#[cfg(test)]
mod client_cookie_tests {
    use axum_extra::extract::{
        PrivateCookieJar,
        cookie::{Cookie, Key, SameSite},
    };
    use sha2::{Digest, Sha512};

    use crate::{Error, tabs::ClientId};

    use super::{
        CLIENT_COOKIE_DURATION, COOKIE_CLIENT_ID, get_client_id, get_or_create_client_id,
        set_client_id_cookie,
    };

    fn get_jar() -> PrivateCookieJar {
        let hash = Sha512::digest(b"foobar");
        let key = Key::from(&hash);

        PrivateCookieJar::new(key)
    }

    #[test]
    fn can_set_and_get_client_id() {
        let client_id = ClientId::new();

        let jar = set_client_id_cookie(get_jar(), client_id);

        assert_eq!(get_client_id(&jar), Ok(client_id));
        let cookie = jar.get(COOKIE_CLIENT_ID).unwrap();
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(CLIENT_COOKIE_DURATION));
    }

    #[test]
    fn missing_cookie_is_an_error() {
        assert_eq!(get_client_id(&get_jar()), Err(Error::ClientCookieMissing));
    }

    #[test]
    fn invalid_cookie_is_an_error() {
        let jar = get_jar().add(Cookie::new(COOKIE_CLIENT_ID, "not-a-uuid"));

        assert_eq!(get_client_id(&jar), Err(Error::ClientCookieMissing));
    }

    #[test]
    fn keeps_existing_client_id() {
        let client_id = ClientId::new();
        let jar = set_client_id_cookie(get_jar(), client_id);

        let (_, got) = get_or_create_client_id(jar);

        assert_eq!(got, client_id);
    }

    #[test]
    fn creates_missing_client_id() {
        let (jar, client_id) = get_or_create_client_id(get_jar());

        assert_eq!(get_client_id(&jar), Ok(client_id));
    }
}
