use std::sync::Arc;

use services::Services;

use crate::metrics::Metrics;

pub const REFRESH_COOKIE: &str = "refresh_token";
const REFRESH_COOKIE_PATH: &str = "/api/auth";

#[derive(Clone)]
pub struct AppState {
    pub services: Services,
    pub metrics: Arc<Metrics>,
    pub cookie: CookiePolicy,
}

/// Attributes of the HTTP-only refresh-token cookie.
#[derive(Debug, Clone, Copy)]
pub struct CookiePolicy {
    pub secure: bool,
    pub max_age_secs: u64,
}

impl CookiePolicy {
    pub fn set(&self, token: &str) -> String {
        self.build(token, self.max_age_secs)
    }

    pub fn clear(&self) -> String {
        self.build("", 0)
    }

    fn build(&self, value: &str, max_age: u64) -> String {
        let mut cookie = format!(
            "{REFRESH_COOKIE}={value}; Path={REFRESH_COOKIE_PATH}; Max-Age={max_age}; HttpOnly; SameSite=Lax"
        );
        if self.secure {
            cookie.push_str("; Secure");
        }
        cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cookie_attributes() {
        let policy = CookiePolicy { secure: true, max_age_secs: 60 };
        assert_eq!(
            policy.set("abc"),
            "refresh_token=abc; Path=/api/auth; Max-Age=60; HttpOnly; SameSite=Lax; Secure"
        );
        let plain = CookiePolicy { secure: false, max_age_secs: 60 };
        assert_eq!(
            plain.clear(),
            "refresh_token=; Path=/api/auth; Max-Age=0; HttpOnly; SameSite=Lax"
        );
    }
}
