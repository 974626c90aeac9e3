//! Typed views over groups of configuration items
//!
//! Each view reads its items from the manager and falls back to the zero
//! value when an item is unset, so callers get a complete struct even on a
//! partially configured deployment.

use crate::manager::ConfigManager;
use adminserver_core::items::*;
use adminserver_core::AuthMode;
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LdapConf {
    pub url: String,
    pub search_dn: String,
    #[serde(skip_serializing)]
    pub search_password: String,
    pub base_dn: String,
    pub uid: String,
    pub filter: String,
    pub scope: i32,
    pub timeout: i32,
    pub verify_cert: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LdapGroupConf {
    pub base_dn: String,
    pub search_filter: String,
    pub attribute_name: String,
    pub search_scope: i32,
    pub admin_dn: String,
    pub membership_attribute: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EmailSettings {
    pub host: String,
    pub port: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub ssl: bool,
    pub from: String,
    pub identity: String,
    pub insecure: bool,
}

/// Connection settings of a PostgreSQL database
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PostgresSettings {
    pub host: String,
    pub port: i32,
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub database: String,
    pub sslmode: String,
}

impl PostgresSettings {
    /// `postgres://` connection URL
    pub fn connection_url(&self) -> String {
        let mut url = format!(
            "postgres://{}:{}@{}:{}/{}",
            self.username, self.password, self.host, self.port, self.database
        );
        if !self.sslmode.is_empty() {
            url.push_str("?sslmode=");
            url.push_str(&self.sslmode);
        }
        url
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DatabaseSettings {
    pub database_type: String,
    pub postgresql: PostgresSettings,
}

pub type ClairDbSettings = PostgresSettings;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UaaSettings {
    pub endpoint: String,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub verify_cert: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HttpAuthProxySettings {
    pub endpoint: String,
    pub tokenreview_endpoint: String,
    pub verify_cert: bool,
    pub always_onboard: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OidcSettings {
    pub name: String,
    pub endpoint: String,
    pub client_id: String,
    #[serde(skip_serializing)]
    pub client_secret: String,
    pub scope: Vec<String>,
    pub verify_cert: bool,
}

impl ConfigManager {
    fn string_or_default(&self, name: &str) -> String {
        self.get_string(name).unwrap_or_default()
    }

    fn password_or_default(&self, name: &str) -> String {
        self.get_password(name).unwrap_or_default()
    }

    fn int_or_default(&self, name: &str) -> i32 {
        self.get_int(name).unwrap_or_default()
    }

    fn bool_or_default(&self, name: &str) -> bool {
        self.get_bool(name).unwrap_or_default()
    }

    pub fn ldap_conf(&self) -> LdapConf {
        LdapConf {
            url: self.string_or_default(LDAP_URL),
            search_dn: self.string_or_default(LDAP_SEARCH_DN),
            search_password: self.password_or_default(LDAP_SEARCH_PASSWORD),
            base_dn: self.string_or_default(LDAP_BASE_DN),
            uid: self.string_or_default(LDAP_UID),
            filter: self.string_or_default(LDAP_FILTER),
            scope: self.int_or_default(LDAP_SCOPE),
            timeout: self.int_or_default(LDAP_TIMEOUT),
            verify_cert: self.bool_or_default(LDAP_VERIFY_CERT),
        }
    }

    pub fn ldap_group_conf(&self) -> LdapGroupConf {
        LdapGroupConf {
            base_dn: self.string_or_default(LDAP_GROUP_BASE_DN),
            search_filter: self.string_or_default(LDAP_GROUP_SEARCH_FILTER),
            attribute_name: self.string_or_default(LDAP_GROUP_ATTRIBUTE_NAME),
            search_scope: self.int_or_default(LDAP_GROUP_SEARCH_SCOPE),
            admin_dn: self.string_or_default(LDAP_GROUP_ADMIN_DN),
            membership_attribute: self.string_or_default(LDAP_GROUP_MEMBERSHIP_ATTRIBUTE),
        }
    }

    pub fn email_settings(&self) -> EmailSettings {
        EmailSettings {
            host: self.string_or_default(EMAIL_HOST),
            port: self.int_or_default(EMAIL_PORT),
            username: self.string_or_default(EMAIL_USERNAME),
            password: self.password_or_default(EMAIL_PASSWORD),
            ssl: self.bool_or_default(EMAIL_SSL),
            from: self.string_or_default(EMAIL_FROM),
            identity: self.string_or_default(EMAIL_IDENTITY),
            insecure: self.bool_or_default(EMAIL_INSECURE),
        }
    }

    pub fn database_settings(&self) -> DatabaseSettings {
        DatabaseSettings {
            database_type: self.string_or_default(DATABASE_TYPE),
            postgresql: PostgresSettings {
                host: self.string_or_default(POSTGRESQL_HOST),
                port: self.int_or_default(POSTGRESQL_PORT),
                username: self.string_or_default(POSTGRESQL_USERNAME),
                password: self.password_or_default(POSTGRESQL_PASSWORD),
                database: self.string_or_default(POSTGRESQL_DATABASE),
                sslmode: self.string_or_default(POSTGRESQL_SSLMODE),
            },
        }
    }

    pub fn clair_db_settings(&self) -> ClairDbSettings {
        PostgresSettings {
            host: self.string_or_default(CLAIR_DB_HOST),
            port: self.int_or_default(CLAIR_DB_PORT),
            username: self.string_or_default(CLAIR_DB_USERNAME),
            password: self.password_or_default(CLAIR_DB_PASSWORD),
            database: self.string_or_default(CLAIR_DB),
            sslmode: self.string_or_default(CLAIR_DB_SSLMODE),
        }
    }

    pub fn uaa_settings(&self) -> UaaSettings {
        UaaSettings {
            endpoint: self.string_or_default(UAA_ENDPOINT),
            client_id: self.string_or_default(UAA_CLIENT_ID),
            client_secret: self.string_or_default(UAA_CLIENT_SECRET),
            verify_cert: self.bool_or_default(UAA_VERIFY_CERT),
        }
    }

    pub fn http_auth_proxy_settings(&self) -> HttpAuthProxySettings {
        HttpAuthProxySettings {
            endpoint: self.string_or_default(HTTP_AUTHPROXY_ENDPOINT),
            tokenreview_endpoint: self.string_or_default(HTTP_AUTHPROXY_TOKENREVIEW_ENDPOINT),
            verify_cert: self.bool_or_default(HTTP_AUTHPROXY_VERIFY_CERT),
            always_onboard: self.bool_or_default(HTTP_AUTHPROXY_ALWAYS_ONBOARD),
        }
    }

    pub fn oidc_settings(&self) -> OidcSettings {
        OidcSettings {
            name: self.string_or_default(OIDC_NAME),
            endpoint: self.string_or_default(OIDC_ENDPOINT),
            client_id: self.string_or_default(OIDC_CLIENT_ID),
            client_secret: self.password_or_default(OIDC_CLIENT_SECRET),
            scope: self
                .string_or_default(OIDC_SCOPE)
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            verify_cert: self.bool_or_default(OIDC_VERIFY_CERT),
        }
    }

    /// Active authentication mode, `db_auth` when unset
    pub fn auth_mode(&self) -> AuthMode {
        self.get_string(AUTH_MODE)
            .ok()
            .and_then(|mode| mode.parse().ok())
            .unwrap_or(AuthMode::DbAuth)
    }

    pub fn self_registration(&self) -> bool {
        self.bool_or_default(SELF_REGISTRATION)
    }

    pub fn read_only(&self) -> bool {
        self.bool_or_default(READ_ONLY)
    }

    /// Token lifetime; the item is expressed in minutes
    pub fn token_expiration(&self) -> Duration {
        Duration::from_secs(self.int_or_default(TOKEN_EXPIRATION).max(0) as u64 * 60)
    }

    pub fn with_notary(&self) -> bool {
        self.bool_or_default(WITH_NOTARY)
    }

    pub fn with_clair(&self) -> bool {
        self.bool_or_default(WITH_CLAIR)
    }

    pub fn with_chartmuseum(&self) -> bool {
        self.bool_or_default(WITH_CHARTMUSEUM)
    }

    pub fn ext_endpoint(&self) -> String {
        self.string_or_default(EXT_ENDPOINT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use adminserver_core::items::default_items;
    use adminserver_core::MetadataRegistry;
    use adminserver_storage::{DriverOptions, InMemoryDriver};
    use std::sync::Arc;

    fn manager(env: Environment) -> ConfigManager {
        ConfigManager::local(
            Arc::new(MetadataRegistry::with_items(default_items())),
            Arc::new(InMemoryDriver::new()),
            env,
            DriverOptions::default(),
        )
    }

    #[test]
    fn test_defaults_fill_views() {
        let manager = manager(Environment::empty());

        let ldap = manager.ldap_conf();
        assert_eq!(ldap.uid, "cn");
        assert_eq!(ldap.scope, 2);
        assert_eq!(ldap.timeout, 5);
        assert!(ldap.verify_cert);
        assert!(ldap.url.is_empty());

        let email = manager.email_settings();
        assert_eq!(email.port, 25);
        assert_eq!(email.host, "smtp.mydomain.com");

        assert_eq!(manager.auth_mode(), AuthMode::DbAuth);
        assert!(manager.self_registration());
        assert!(!manager.read_only());
        assert_eq!(manager.token_expiration(), Duration::from_secs(30 * 60));
        assert!(!manager.with_notary());
        assert_eq!(manager.ext_endpoint(), "https://host01.com");
    }

    #[test]
    fn test_database_settings_follow_environment() {
        let manager = manager(Environment::snapshot([
            ("POSTGRESQL_HOST", "db.internal"),
            ("POSTGRESQL_PASSWORD", "pw"),
            ("POSTGRESQL_SSLMODE", "require"),
        ]));

        let db = manager.database_settings();
        assert_eq!(db.database_type, "postgresql");
        assert_eq!(
            db.postgresql.connection_url(),
            "postgres://postgres:pw@db.internal:5432/registry?sslmode=require"
        );
        assert_eq!(manager.clair_db_settings().database, "postgres");
    }

    #[test]
    fn test_oidc_scope_is_split() {
        let manager = manager(Environment::empty());
        manager.set(OIDC_SCOPE, "openid, profile,,email").unwrap();
        manager.set(AUTH_MODE, "oidc_auth").unwrap();

        assert_eq!(manager.oidc_settings().scope, vec!["openid", "profile", "email"]);
        assert_eq!(manager.auth_mode(), AuthMode::OidcAuth);
    }

    #[test]
    fn test_secrets_are_not_serialized() {
        let manager = manager(Environment::empty());
        manager.set(EMAIL_PASSWORD, "s3cr3t").unwrap();
        let email = manager.email_settings();
        assert_eq!(email.password, "s3cr3t");
        let rendered = serde_json::to_string(&email).unwrap();
        assert!(!rendered.contains("s3cr3t"));
    }
}
